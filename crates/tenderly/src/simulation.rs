//! Single transaction simulations, stateless or on top of a fork.

use oval_utils::log::{debug, info};

use crate::{
    api::{parse_body, ApiClient},
    error::{Result, TenderlyError},
    validate,
};

pub static ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Fork to simulate on. With `root` set, the simulation starts from the state
/// left by that earlier simulation instead of the fork's initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ForkTarget {
    pub id: String,
    pub root: Option<String>,
}

impl ForkTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            root: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub chain_id: u64,
    pub to: Option<String>,
    /// `0x` prefixed calldata.
    pub input: Option<String>,
    /// Decimal or `0x` hex wei amount.
    pub value: Option<String>,
    /// Sender, the zero address when unset.
    pub from: Option<String>,
    pub timestamp_override: Option<u64>,
    pub fork: Option<ForkTarget>,
    pub description: Option<String>,
}

impl SimulationParams {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(to) = &self.to {
            validate::require_address("to", to)?;
        }
        if let Some(from) = &self.from {
            validate::require_address("from", from)?;
        }
        if let Some(input) = &self.input {
            if !validate::is_bytes_like(input) {
                return Err(TenderlyError::validation(format!("invalid input: {}", input)));
            }
        }
        if let Some(value) = &self.value {
            validate::require_uint("value", value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResultUrl {
    pub url: String,
    /// False when the project is not publicly browsable and the URL needs a login.
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub id: String,
    /// True if the transaction executed without revert.
    pub status: bool,
    pub gas_used: u64,
    pub result_url: ResultUrl,
}

#[derive(Debug, serde::Serialize)]
struct BlockHeader {
    timestamp: String,
}

#[derive(Debug, serde::Serialize)]
struct SimulationRequest<'a> {
    save: bool,
    save_if_fails: bool,
    simulation_type: &'static str,
    network_id: String,
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_header: Option<BlockHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a SimulationParams> for SimulationRequest<'a> {
    fn from(params: &'a SimulationParams) -> Self {
        Self {
            save: true,
            save_if_fails: true,
            simulation_type: "full",
            network_id: params.chain_id.to_string(),
            from: params.from.as_deref().unwrap_or(ZERO_ADDRESS),
            to: params.to.as_deref(),
            input: params.input.as_deref(),
            value: params.value.as_deref(),
            root: params.fork.as_ref().and_then(|f| f.root.as_deref()),
            block_header: params.timestamp_override.map(|ts| BlockHeader {
                timestamp: validate::to_hex_bytes(ts),
            }),
            description: params.description.as_deref(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct Receipt {
    #[serde(rename = "gasUsed")]
    gas_used: String,
}

#[derive(Debug, serde::Deserialize)]
struct Simulation {
    id: String,
    status: bool,
    receipt: Receipt,
}

#[derive(Debug, serde::Deserialize)]
struct SimulationResponse {
    simulation: Simulation,
}

#[derive(Debug, serde::Deserialize)]
struct ProjectVisibility {
    public: bool,
}

#[derive(Debug, serde::Deserialize)]
struct PublicProjectResponse {
    project: ProjectVisibility,
}

/// Parsed simulation response: `(id, status, gas used)`.
fn parse_simulation(body: &str) -> Result<(String, bool, u64)> {
    let response: SimulationResponse = parse_body("simulation", body)?;
    let simulation = response.simulation;
    let gas_used = simulation
        .receipt
        .gas_used
        .trim()
        .parse::<u64>()
        .map_err(|_| TenderlyError::MalformedResponse {
            what: "simulation",
            body: body.to_string(),
        })?;
    Ok((simulation.id, simulation.status, gas_used))
}

/// Runs transaction simulations of one Tenderly project.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    api: ApiClient,
}

impl SimulationRunner {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn simulate(&self, params: &SimulationParams) -> Result<SimulationResult> {
        params.validate()?;

        let url = match &params.fork {
            None => self.api.project_url("simulate"),
            Some(fork) => self.api.project_url(&format!("fork/{}/simulate", fork.id)),
        };
        let text = self
            .api
            .post(&url, &SimulationRequest::from(params))
            .await?;
        let (id, status, gas_used) = parse_simulation(&text)?;

        let public = self.is_project_public().await;
        let result_url = self.result_url(&id, params.fork.as_ref(), public);
        info!(
            simulation = %id,
            status,
            gas_used,
            url = %result_url.url,
            "simulated transaction"
        );
        Ok(SimulationResult {
            id,
            status,
            gas_used,
            result_url,
        })
    }

    /// Best effort: any failure means the project is not public.
    pub async fn is_project_public(&self) -> bool {
        let probe = async {
            let text = self.api.get(&self.api.public_project_url()).await?;
            parse_body::<PublicProjectResponse>("public project", &text)
        };
        match probe.await {
            Ok(response) => response.project.public,
            Err(e) => {
                debug!(error = %e, "public project probe failed, assuming private");
                false
            }
        }
    }

    pub fn result_url(
        &self,
        simulation_id: &str,
        fork: Option<&ForkTarget>,
        public: bool,
    ) -> ResultUrl {
        let env = self.api.env();
        let path = if public {
            let kind = match fork {
                Some(_) => "fork-simulation",
                None => "simulator",
            };
            format!(
                "public/{}/{}/{}/{}",
                env.user, env.project, kind, simulation_id
            )
        } else {
            let kind = match fork {
                Some(fork) => format!("fork/{}/simulation", fork.id),
                None => "simulator".to_string(),
            };
            format!("{}/{}/{}/{}", env.user, env.project, kind, simulation_id)
        };
        ResultUrl {
            url: self.api.dashboard_url(&path),
            public,
        }
    }
}
