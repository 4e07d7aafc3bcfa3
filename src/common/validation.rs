// src/common/validation.rs

use std::borrow::Cow;

use validator::ValidationError;

use crate::common::error::AppError;

/// Validador `custom` para nomes: recusa texto só com espaços.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("O nome não pode ficar em branco."));
        return Err(err);
    }
    Ok(())
}

// Os serviços também são chamados sem passar pelos handlers
pub fn clean_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("O nome não pode ficar em branco.".into()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_names_are_rejected() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
        assert!(not_blank(" Vendas ").is_ok());
    }

    #[test]
    fn clean_name_trims_or_fails() {
        assert_eq!(clean_name("  Vendas ").unwrap(), "Vendas");
        assert!(matches!(clean_name("   "), Err(AppError::InvalidInput(_))));
    }
}
