//! Resource module entry point: parameter checks, device round trip, and
//! the result record.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use zone_policy_core::validate::check_identities;
use zone_policy_core::{gather, reconcile, simulate, State, ValidationError, Zone};

use crate::transport::{Transport, TransportError};

/// Parameters for one module run.
#[derive(Debug, Clone, Default)]
pub struct ModuleParams {
    pub config: Option<Vec<Zone>>,
    pub running_config: Option<String>,
    pub state: State,
    pub check_mode: bool,
}

/// Parameter combinations the module refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("parameters are mutually exclusive: config|running_config")]
    MutuallyExclusive,
    #[error("state is {0} but config is missing")]
    MissingConfig(State),
    #[error("state is parsed but running_config is missing")]
    MissingRunningConfig,
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What a module run reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Vec<Zone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Vec<Zone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gathered: Option<Vec<Zone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Vec<Zone>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl ModuleResult {
    /// Commands the run produced, whichever state produced them.
    pub fn command_lines(&self) -> &[String] {
        self.commands
            .as_deref()
            .or(self.rendered.as_deref())
            .unwrap_or_default()
    }

    /// Facts the run returned, for the read-only states.
    pub fn facts(&self) -> Option<&[Zone]> {
        self.gathered.as_deref().or(self.parsed.as_deref())
    }
}

/// Check which parameters a state needs.
pub fn validate_params(params: &ModuleParams) -> Result<(), ParamError> {
    if params.config.is_some() && params.running_config.is_some() {
        return Err(ParamError::MutuallyExclusive);
    }

    match params.state {
        State::Merged | State::Replaced | State::Overridden | State::Rendered
            if params.config.is_none() =>
        {
            Err(ParamError::MissingConfig(params.state))
        }
        State::Parsed if params.running_config.is_none() => Err(ParamError::MissingRunningConfig),
        _ => Ok(()),
    }
}

/// Run the module once.
///
/// Read-only states never hand commands to `transport`; `rendered` and
/// `parsed` never touch it at all.
pub fn execute(
    params: ModuleParams,
    transport: &mut dyn Transport,
) -> Result<ModuleResult, ModuleError> {
    validate_params(&params)?;
    let want = params.config.unwrap_or_default();
    check_identities(&want)?;

    match params.state {
        State::Parsed => {
            let text = params.running_config.unwrap_or_default();
            Ok(ModuleResult {
                parsed: Some(gather(&text)),
                ..ModuleResult::default()
            })
        }
        State::Gathered => {
            let text = transport.fetch_config()?;
            Ok(ModuleResult {
                gathered: Some(gather(&text)),
                ..ModuleResult::default()
            })
        }
        State::Rendered => {
            let plan = reconcile(want, Vec::new(), State::Rendered);
            Ok(ModuleResult {
                rendered: Some(plan.commands),
                failures: plan.failures.iter().map(ToString::to_string).collect(),
                ..ModuleResult::default()
            })
        }
        state => {
            let have = gather(&transport.fetch_config()?);
            debug!(zones = have.len(), "gathered device state");

            let plan = reconcile(want, have.clone(), state);
            let changed = !plan.is_empty();
            if changed && !params.check_mode {
                transport.run_commands(&plan.commands)?;
            }
            info!(
                state = %state,
                changed,
                check_mode = params.check_mode,
                commands = plan.commands.len(),
                "module run finished"
            );

            let after = changed.then(|| simulate(&have, &plan.changes));
            Ok(ModuleResult {
                changed,
                commands: Some(plan.commands),
                before: Some(have),
                after,
                failures: plan.failures.iter().map(ToString::to_string).collect(),
                ..ModuleResult::default()
            })
        }
    }
}
