//! Creation, inspection and mutation of Tenderly forks.

use indexmap::IndexMap;
use oval_utils::log::{debug, info};
use serde_json::{json, Value};

use crate::{
    api::{parse_body, ApiClient},
    error::{Result, TenderlyError},
    validate,
};

/// Parameters of a new fork. `tx_index` requires `block_number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkParams {
    pub chain_id: u64,
    pub block_number: Option<u64>,
    pub tx_index: Option<u64>,
    pub alias: Option<String>,
    pub description: Option<String>,
}

impl ForkParams {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain_id == 0 {
            return Err(TenderlyError::validation(format!(
                "invalid chainId: {}",
                self.chain_id
            )));
        }
        if self.block_number.is_none() && self.tx_index.is_some() {
            return Err(TenderlyError::validation(
                "txIndex cannot be specified without blockNumber",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkAccount {
    pub address: String,
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    pub id: String,
    pub block_number: u64,
    pub tx_index: u64,
    /// Pre-funded test accounts, in the order the API lists them.
    pub accounts: Vec<ForkAccount>,
    pub rpc_url: String,
    /// Latest state mutating operation. None until the fork has been mutated.
    pub head_id: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct ForkRequest<'a> {
    network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a ForkParams> for ForkRequest<'a> {
    fn from(params: &'a ForkParams) -> Self {
        Self {
            network_id: params.chain_id.to_string(),
            block_number: params.block_number,
            transaction_index: params.tx_index,
            alias: params.alias.as_deref(),
            description: params.description.as_deref(),
        }
    }
}

/// The `simulation_fork` object, as far as we use it.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct SimulationFork {
    id: String,
    block_number: u64,
    transaction_index: u64,
    accounts: IndexMap<String, String>,
    rpc_url: String,
    global_head: Option<String>,
    // Not part of the checked shape: anything that is not an equal string never matches.
    #[serde(default)]
    description: Option<Value>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct RootTransaction {
    id: String,
}

/// Body of fork create and fork get. `root_transaction` only comes with creation.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct ForkResponse {
    simulation_fork: SimulationFork,
    root_transaction: Option<RootTransaction>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ForkListResponse {
    simulation_forks: Vec<SimulationFork>,
}

/// `global_head` wins over the root transaction id. An empty head counts as absent.
pub fn head_id(global_head: Option<String>, root_transaction_id: Option<String>) -> Option<String> {
    global_head.filter(|h| !h.is_empty()).or(root_transaction_id)
}

impl SimulationFork {
    fn has_description(&self, description: &str) -> bool {
        matches!(&self.description, Some(Value::String(d)) if d == description)
    }

    fn into_fork(self, root_transaction_id: Option<String>) -> Fork {
        Fork {
            id: self.id,
            block_number: self.block_number,
            tx_index: self.transaction_index,
            accounts: self
                .accounts
                .into_iter()
                .map(|(address, private_key)| ForkAccount {
                    address,
                    private_key,
                })
                .collect(),
            rpc_url: self.rpc_url,
            head_id: head_id(self.global_head, root_transaction_id),
        }
    }
}

impl From<ForkResponse> for Fork {
    fn from(response: ForkResponse) -> Self {
        response
            .simulation_fork
            .into_fork(response.root_transaction.map(|r| r.id))
    }
}

pub(crate) fn parse_fork(body: &str) -> Result<Fork> {
    parse_body::<ForkResponse>("fork", body).map(Fork::from)
}

pub(crate) fn parse_fork_list(body: &str) -> Result<Vec<SimulationFork>> {
    parse_body::<ForkListResponse>("fork list", body).map(|r| r.simulation_forks)
}

/// Fork operations of one Tenderly project.
#[derive(Debug, Clone)]
pub struct ForkManager {
    api: ApiClient,
}

impl ForkManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, params: &ForkParams) -> Result<Fork> {
        params.validate()?;
        let text = self
            .api
            .post(&self.api.project_url("fork"), &ForkRequest::from(params))
            .await?;
        let fork = parse_fork(&text)?;
        info!(
            fork = %fork.id,
            chain_id = params.chain_id,
            block_number = fork.block_number,
            "created fork"
        );
        Ok(fork)
    }

    pub async fn get(&self, fork_id: &str) -> Result<Fork> {
        let url = self.api.project_url(&format!("fork/{}", fork_id));
        let text = self.api.get(&url).await?;
        parse_fork(&text)
    }

    /// Makes the fork public and returns its dashboard URL.
    pub async fn share(&self, fork_id: &str) -> Result<String> {
        self.set_sharing(fork_id, true).await?;
        let url = self
            .api
            .dashboard_url(&format!("shared/fork/{}/transactions", fork_id));
        info!(fork = fork_id, url = %url, "shared fork");
        Ok(url)
    }

    pub async fn unshare(&self, fork_id: &str) -> Result<()> {
        self.set_sharing(fork_id, false).await
    }

    async fn set_sharing(&self, fork_id: &str, share: bool) -> Result<()> {
        let cmd = if share { "share" } else { "unshare" };
        let url = self.api.project_url(&format!("fork/{}/{}", fork_id, cmd));
        self.api.post(&url, &json!({})).await?;
        Ok(())
    }

    pub async fn delete(&self, fork_id: &str) -> Result<()> {
        let url = self.api.project_url(&format!("fork/{}", fork_id));
        self.api.delete(&url).await?;
        info!(fork = fork_id, "deleted fork");
        Ok(())
    }

    /// Overrides the balance of `address` on the fork through the fork's own
    /// RPC endpoint and returns the new head of the fork.
    pub async fn set_balance(
        &self,
        fork_id: &str,
        address: &str,
        balance_wei: &str,
    ) -> Result<String> {
        validate::require_address("account", address)?;
        let balance = validate::require_uint("balance", balance_wei)?;

        let fork = self.get(fork_id).await?;
        self.api
            .rpc_call(
                &fork.rpc_url,
                "tenderly_setBalance",
                json!([[address], validate::to_hex_quantity(balance)]),
            )
            .await?;

        // the balance change moves the head, so fetch the fork again
        let updated = self.get(fork_id).await?;
        let head = updated
            .head_id
            .ok_or_else(|| TenderlyError::HeadNotFound(fork_id.to_string()))?;
        info!(fork = fork_id, address, balance = %balance, head = %head, "set balance");
        Ok(head)
    }

    /// First fork of the project whose description equals `description`.
    pub async fn find_by_description(&self, description: &str) -> Result<Option<Fork>> {
        let text = self.api.get(&self.api.project_url("forks")).await?;
        let forks = parse_fork_list(&text)?;
        debug!(count = forks.len(), description, "listed forks");
        Ok(forks
            .into_iter()
            .find(|f| f.has_description(description))
            .map(|f| f.into_fork(None)))
    }

    /// Labels a simulation that ran on the fork. Cosmetic only.
    pub async fn set_simulation_description(
        &self,
        fork_id: &str,
        simulation_id: &str,
        description: &str,
    ) -> Result<()> {
        let url = self
            .api
            .project_url(&format!("fork/{}/transaction/{}", fork_id, simulation_id));
        self.api
            .put(&url, &json!({ "description": description }))
            .await?;
        Ok(())
    }
}
