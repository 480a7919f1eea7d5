use ms_primitives::policy;
use ms_transaction::error::ValidationError;

use crate::blockchain::CurrencyRegistry;

/// Validates currency name/code/description shape and uniqueness (spec
/// §4.2, C3).
pub struct NamingValidator;

impl NamingValidator {
    pub fn validate_naming(
        registry: &dyn CurrencyRegistry,
        name: &str,
        code: &str,
        description: &str,
    ) -> Result<(), ValidationError> {
        if name.len() < policy::MIN_CURRENCY_NAME_LENGTH || name.len() > policy::MAX_CURRENCY_NAME_LENGTH {
            return Err(ValidationError::NotValid("invalid currency name length"));
        }
        if code.len() != policy::CURRENCY_CODE_LENGTH {
            return Err(ValidationError::NotValid("invalid currency code length"));
        }
        if description.len() > policy::MAX_CURRENCY_DESCRIPTION_LENGTH {
            return Err(ValidationError::NotValid("currency description too long"));
        }

        let normalized_name = name.to_lowercase();
        if !normalized_name.chars().all(|c| policy::ALPHABET.contains(c)) {
            return Err(ValidationError::NotValid(
                "currency name contains invalid characters",
            ));
        }
        if !code
            .chars()
            .all(|c| policy::ALLOWED_CURRENCY_CODE_LETTERS.contains(c))
        {
            return Err(ValidationError::NotValid(
                "currency code contains invalid characters",
            ));
        }

        if code == "NXT" || normalized_name == "nxt" {
            return Err(ValidationError::NotValid("name already used"));
        }

        let code_as_name = code.to_lowercase();

        if registry.find_currency_by_name(&normalized_name).is_some()
            || registry.find_currency_by_code(&name.to_uppercase()).is_some()
            || registry.find_currency_by_code(code).is_some()
            || registry.find_currency_by_name(&code_as_name).is_some()
        {
            return Err(ValidationError::NotCurrentlyValid(
                "currency name or code already in use",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_transaction::Currency;
    use ms_transaction::CapabilityFlags;
    use ms_primitives::{Address, Coin};

    struct FakeRegistry {
        currencies: Vec<Currency>,
    }

    impl CurrencyRegistry for FakeRegistry {
        fn get_currency(&self, id: u64) -> Option<Currency> {
            self.currencies.iter().find(|c| c.id == id).cloned()
        }

        fn find_currency_by_name(&self, normalized_name: &str) -> Option<Currency> {
            self.currencies
                .iter()
                .find(|c| c.name.to_lowercase() == normalized_name)
                .cloned()
        }

        fn find_currency_by_code(&self, code: &str) -> Option<Currency> {
            self.currencies.iter().find(|c| c.code == code).cloned()
        }
    }

    fn currency(name: &str, code: &str) -> Currency {
        Currency {
            id: 1,
            account_id: Address::from_u64(1),
            name: name.to_string(),
            code: code.to_string(),
            description: String::new(),
            currency_type: CapabilityFlags::EXCHANGEABLE,
            current_supply: Coin::ZERO,
            issuance_height: 0,
        }
    }

    #[test]
    fn rejects_reserved_nxt_name() {
        let registry = FakeRegistry { currencies: vec![] };
        let err = NamingValidator::validate_naming(&registry, "nxt", "ABC", "").unwrap_err();
        assert_eq!(err, ValidationError::NotValid("name already used"));
    }

    #[test]
    fn rejects_duplicate_name_as_not_currently_valid() {
        let registry = FakeRegistry {
            currencies: vec![currency("gold", "GLD")],
        };
        let err = NamingValidator::validate_naming(&registry, "Gold", "SLV", "").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotCurrentlyValid("currency name or code already in use")
        );
    }

    #[test]
    fn accepts_fresh_name_and_code() {
        let registry = FakeRegistry { currencies: vec![] };
        assert!(NamingValidator::validate_naming(&registry, "gold", "GLD", "shiny").is_ok());
    }

    #[test]
    fn rejects_code_length_mismatch() {
        let registry = FakeRegistry { currencies: vec![] };
        let err = NamingValidator::validate_naming(&registry, "gold", "GOLD", "").unwrap_err();
        assert_eq!(err, ValidationError::NotValid("invalid currency code length"));
    }
}
