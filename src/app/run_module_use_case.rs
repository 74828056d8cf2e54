use serde_json::Value;
use tracing::{info, warn};

use crate::app::ports::WapiPort;
use crate::config::ProviderConfig;
use crate::constants::EXTENSIBLE_ATTRIBUTE_DEF;
use crate::error::Result;
use crate::extensible_attribute;
use crate::params::Params;
use crate::schema::IbSpec;
use crate::types::RunResult;

/// Use case for running one module invocation: validate and shape the
/// arguments, then hand them to the reconciliation client
pub struct RunModuleUseCase<'a> {
    object_type: &'a str,
    spec: &'a IbSpec,
}

impl<'a> RunModuleUseCase<'a> {
    pub fn new(object_type: &'a str, spec: &'a IbSpec) -> Self {
        Self { object_type, spec }
    }

    /// Create a use case for `extensibleattributedef`
    pub fn extensible_attribute() -> RunModuleUseCase<'static> {
        RunModuleUseCase::new(EXTENSIBLE_ATTRIBUTE_DEF, extensible_attribute::ib_spec())
    }

    /// Parse, validate and normalize raw arguments. Nothing leaves the
    /// process here.
    pub fn prepare(&self, raw: Value, provider_fallback: &ProviderConfig) -> Result<Params> {
        let mut params = Params::parse(raw, self.spec, provider_fallback)?;
        self.spec.apply_transforms(&mut params.fields)?;

        for note in self.spec.advise(&params) {
            warn!(object_type = self.object_type, "{}", note);
        }
        Ok(params)
    }

    /// Delegate to the client and return its result untouched
    pub fn execute(&self, params: &Params, client: &dyn WapiPort) -> Result<RunResult> {
        info!(
            object_type = self.object_type,
            name = params.field_str("name").unwrap_or_default(),
            state = ?params.state,
            check_mode = params.check_mode,
            "delegating to WAPI client"
        );
        let result = client.run(self.object_type, self.spec, params)?;
        info!(changed = result.changed, "WAPI client finished");
        Ok(result)
    }

    pub fn run(
        &self,
        raw: Value,
        provider_fallback: &ProviderConfig,
        client: &dyn WapiPort,
    ) -> Result<RunResult> {
        let params = self.prepare(raw, provider_fallback)?;
        self.execute(&params, client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::MockWapiPort;
    use crate::normalize::options_transform;
    use crate::schema::{FieldKind, FieldSpec};
    use crate::types::{Diff, State};
    use serde_json::json;

    fn provider() -> Value {
        json!({"host": "nios.example.com", "username": "admin", "password": "admin"})
    }

    fn options_spec() -> IbSpec {
        IbSpec::new(vec![
            FieldSpec::new("name", FieldKind::Str).required().ib_req(),
            FieldSpec::new("options", FieldKind::List)
                .elements(FieldKind::Dict)
                .transform(options_transform),
        ])
    }

    #[test]
    fn option_without_name_or_num_never_reaches_client() {
        let mut client = MockWapiPort::new();
        client.expect_run().times(0);

        let spec = options_spec();
        let use_case = RunModuleUseCase::new("network", &spec);
        let args = json!({
            "name": "10.0.0.0/24",
            "options": [{"value": "10.0.0.1", "use_option": true}],
            "provider": provider()
        });

        let err = use_case
            .run(args, &ProviderConfig::default(), &client)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "one of `name` or `num` is required for option value");
    }

    #[test]
    fn client_sees_normalized_options() {
        let mut client = MockWapiPort::new();
        client
            .expect_run()
            .times(1)
            .returning(|object_type, _, params| {
                assert_eq!(object_type, "network");
                assert_eq!(
                    params.fields["options"],
                    json!([{"name": "routers", "value": "10.0.0.1"}])
                );
                Ok(RunResult::unchanged(None))
            });

        let spec = options_spec();
        let use_case = RunModuleUseCase::new("network", &spec);
        let args = json!({
            "name": "10.0.0.0/24",
            "options": [{"name": "routers", "num": null, "value": "10.0.0.1", "vendor_class": null}],
            "provider": provider()
        });

        use_case
            .run(args, &ProviderConfig::default(), &client)
            .unwrap();
    }

    #[test]
    fn invalid_arguments_never_reach_client() {
        let mut client = MockWapiPort::new();
        client.expect_run().times(0);

        let use_case = RunModuleUseCase::extensible_attribute();
        let args = json!({"type": "STRING", "provider": provider()});

        let err = use_case
            .run(args, &ProviderConfig::default(), &client)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn spec_advisor_runs_during_prepare() {
        fn advise(params: &Params) -> Vec<String> {
            vec![format!("{} is advisory", params.field_str("name").unwrap_or_default())]
        }
        let spec = IbSpec::new(vec![FieldSpec::new("name", FieldKind::Str).required()])
            .advisor(advise);

        let use_case = RunModuleUseCase::new("network", &spec);
        let params = use_case
            .prepare(
                json!({"name": "10.0.0.0/24", "provider": provider()}),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(spec.advise(&params), vec!["10.0.0.0/24 is advisory".to_string()]);
        assert!(IbSpec::new(Vec::new()).advise(&params).is_empty());
    }

    #[test]
    fn extensible_attribute_spec_reports_ignored_settings() {
        let use_case = RunModuleUseCase::extensible_attribute();
        let params = use_case
            .prepare(
                json!({"name": "d", "type": "DATE", "min": "1", "provider": provider()}),
                &ProviderConfig::default(),
            )
            .unwrap();
        assert_eq!(
            extensible_attribute::ib_spec().advise(&params),
            vec!["min is not applicable to DATE attributes".to_string()]
        );
    }

    #[test]
    fn client_result_is_forwarded_verbatim() {
        let expected = RunResult {
            changed: true,
            diff: Some(Diff {
                before: json!({}),
                after: json!({"name": "my_string", "type": "STRING"}),
            }),
            object_ref: Some("extensibleattributedef/ZG5z:my_string".into()),
        };
        let returned = expected.clone();

        let mut client = MockWapiPort::new();
        client
            .expect_run()
            .times(1)
            .returning(move |object_type, _, params| {
                assert_eq!(object_type, "extensibleattributedef");
                assert_eq!(params.state, State::Present);
                Ok(returned.clone())
            });

        let use_case = RunModuleUseCase::extensible_attribute();
        let args = json!({
            "name": "my_string",
            "type": "STRING",
            "comment": "Created by automation",
            "provider": provider()
        });

        let result = use_case
            .run(args, &ProviderConfig::default(), &client)
            .unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn client_errors_surface_unchanged() {
        let mut client = MockWapiPort::new();
        client.expect_run().times(1).returning(|_, _, _| {
            Err(crate::error::ModuleError::Api {
                status: 401,
                message: "Authorization Required".into(),
            })
        });

        let use_case = RunModuleUseCase::extensible_attribute();
        let args = json!({"name": "my_string", "type": "STRING", "provider": provider()});

        let err = use_case
            .run(args, &ProviderConfig::default(), &client)
            .unwrap_err();
        assert_eq!(err.to_string(), "WAPI error (401): Authorization Required");
    }
}
