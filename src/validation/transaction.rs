//! Rule sets for creating, updating and listing transactions.

use crate::transaction::{NewTransaction, TransactionPatch, TransactionQuery};

use super::{RuleSet, Validator, rules};

impl RuleSet for NewTransaction {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        let kind = fields.required("type", rules::kind);
        let amount = fields.required("amount", rules::amount);
        let category_id = fields.required("category", rules::category_reference);
        let date = fields.optional("date", rules::date);
        let description = fields.optional("description", rules::description);

        Some(NewTransaction {
            kind: kind?,
            amount: amount?,
            category_id: category_id?,
            date,
            description: description.unwrap_or_default(),
        })
    }
}

impl RuleSet for TransactionPatch {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        Some(TransactionPatch {
            kind: fields.optional("type", rules::kind),
            amount: fields.optional("amount", rules::amount),
            category_id: fields.optional("category", rules::category_reference),
            date: fields.optional("date", rules::date),
            description: fields.optional("description", rules::description),
        })
    }
}

impl RuleSet for TransactionQuery {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        Some(TransactionQuery {
            kind: fields.optional("type", rules::kind),
            page: fields.optional("page", rules::non_negative_integer),
            limit: fields.optional("limit", rules::non_negative_integer),
        })
    }
}
