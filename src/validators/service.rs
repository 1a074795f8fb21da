//! Service Validator (§4.8, service half).
//!
//! Name grammar, method-name grammar and uniqueness, and method option
//! validation. RPC input/output type resolution is the coordinator's job
//! (§4.1 step 8) since it needs the resolver and the finished Symbol Table;
//! streaming flags are purely informational per §4.8 and carry no rule.

use std::collections::{HashMap, HashSet};

use crate::ast;
use crate::error::{Result, ValidationError};
use crate::ident;
use crate::validators::option::{self, MethodOptionValues, ServiceOptionValues};

pub fn validate_service_name(s: &ast::Service) -> Result<()> {
    if !ident::is_valid_message_or_service_name(&s.name) {
        return Err(ValidationError::InvalidServiceName { name: s.name.clone(), span: s.span });
    }
    Ok(())
}

pub struct ValidatedService<'a> {
    pub options: ServiceOptionValues<'a>,
    pub method_options: HashMap<String, MethodOptionValues<'a>>,
}

/// Validates everything about `service` except RPC type resolution: name,
/// method name grammar/uniqueness, and service/method option shape.
pub fn validate_service<'a>(service: &'a ast::Service) -> Result<ValidatedService<'a>> {
    validate_service_name(service)?;

    let mut method_names = HashSet::new();
    let mut method_options = HashMap::new();
    for rpc in &service.rpcs {
        if !ident::is_valid_method_name(&rpc.name) {
            return Err(ValidationError::InvalidMethodName { name: rpc.name.clone(), span: rpc.span });
        }
        if !method_names.insert(rpc.name.clone()) {
            return Err(ValidationError::DuplicateMethodName {
                service: service.name.clone(),
                name: rpc.name.clone(),
                span: rpc.span,
            });
        }
        let target = format!("method {}.{}", service.name, rpc.name);
        method_options.insert(rpc.name.clone(), option::validate_method_options(&rpc.options, &target)?);
    }

    let target = format!("service {}", service.name);
    let options = option::validate_service_options(&service.options, &target)?;

    Ok(ValidatedService { options, method_options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Comments, Rpc, Service, Span};

    fn rpc(name: &str) -> Rpc {
        Rpc {
            name: name.into(),
            input_type: "M".into(),
            output_type: "M".into(),
            client_streaming: false,
            server_streaming: false,
            options: vec![],
            comments: Comments::default(),
            span: Span::default(),
        }
    }

    fn service_with(rpcs: Vec<Rpc>) -> Service {
        Service { name: "S".into(), rpcs, options: vec![], comments: Comments::default(), span: Span::default() }
    }

    #[test]
    fn duplicate_method_name_rejected() {
        let s = service_with(vec![rpc("Do"), rpc("Do")]);
        let err = validate_service(&s).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateMethodName { .. }));
    }

    #[test]
    fn lowercase_service_name_rejected() {
        let s = service_with(vec![]);
        let mut s = s;
        s.name = "svc".into();
        let err = validate_service(&s).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidServiceName { .. }));
    }
}
