//! Rule sets for creating and updating categories.

use crate::category::{CategoryPatch, NewCategory};

use super::{RuleSet, Validator, rules};

impl RuleSet for NewCategory {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        let name = fields.required("name", rules::category_name);
        let kind = fields.required("type", rules::kind);
        let color = fields.required("color", rules::color);
        let is_active = fields.optional("isActive", rules::boolean);

        Some(NewCategory {
            name: name?,
            kind: kind?,
            color: color?,
            is_active: is_active.unwrap_or(true),
        })
    }
}

impl RuleSet for CategoryPatch {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        Some(CategoryPatch {
            name: fields.optional("name", rules::category_name),
            kind: fields.optional("type", rules::kind),
            color: fields.optional("color", rules::color),
            is_active: fields.optional("isActive", rules::boolean),
        })
    }
}
