//! File-level Validators (§4.6): syntax, package, import.

use crate::ast;
use crate::error::{Result, ValidationError};
use crate::ident;

pub fn validate_syntax(file: &ast::File) -> Result<()> {
    if file.syntax != "proto3" {
        return Err(ValidationError::InvalidSyntaxVersion { found: file.syntax.clone() });
    }
    Ok(())
}

pub fn validate_package(package: &str) -> Result<()> {
    if package.is_empty() {
        return Ok(());
    }
    if package.starts_with('.') || package.ends_with('.') || package.contains("..") {
        return Err(ValidationError::InvalidPackageName {
            package: package.to_owned(),
            reason: "must not have a leading/trailing dot or an empty component".into(),
        });
    }
    for component in package.split('.') {
        if !ident::is_valid_package_component(component) {
            return Err(ValidationError::InvalidPackageName {
                package: package.to_owned(),
                reason: format!("component {component:?} is not a valid package component"),
            });
        }
    }
    Ok(())
}

pub fn validate_import(import: &ast::Import) -> Result<()> {
    if import.path.is_empty() {
        return Err(ValidationError::InvalidImport {
            path: import.path.clone(),
            reason: "import path must not be empty".into(),
        });
    }
    if import.path.contains("..") {
        return Err(ValidationError::InvalidImport {
            path: import.path.clone(),
            reason: "import path must not contain \"..\"".into(),
        });
    }
    // `modifier` is a single enum (§3.1), so "weak and public" isn't a
    // representable combination here — the proto3 grammar only ever lets
    // an import carry one of `public`/`weak`, never both.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proto2_syntax_rejected() {
        let file = ast::File {
            syntax: "proto2".into(),
            package: None,
            imports: vec![],
            options: vec![],
            messages: vec![],
            enums: vec![],
            services: vec![],
        };
        assert!(matches!(
            validate_syntax(&file),
            Err(ValidationError::InvalidSyntaxVersion { .. })
        ));
    }

    #[test]
    fn package_with_double_dot_rejected() {
        assert!(validate_package("foo..bar").is_err());
    }

    #[test]
    fn package_with_uppercase_component_rejected() {
        assert!(validate_package("foo.Bar").is_err());
    }

    #[test]
    fn empty_package_is_allowed() {
        assert!(validate_package("").is_ok());
    }

    #[test]
    fn import_with_dot_dot_rejected() {
        let import = ast::Import {
            path: "../evil.proto".into(),
            modifier: ast::ImportModifier::Plain,
            span: ast::Span::default(),
        };
        assert!(validate_import(&import).is_err());
    }
}
