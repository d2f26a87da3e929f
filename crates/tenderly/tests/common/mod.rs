#![allow(dead_code)]

use oval_tenderly::{Environment, Tenderly, TenderlyConfig};
use serde_json::{json, Value};

pub const USER: &str = "alice";
pub const PROJECT: &str = "oval";
pub const API_KEY: &str = "test-key";

pub fn tenderly(server: &mockito::Server) -> Tenderly {
    Tenderly::new(
        Environment::new(USER, PROJECT, API_KEY),
        TenderlyConfig::with_base_url(&server.url()),
    )
    .expect("client builds")
}

pub fn project_path(path: &str) -> String {
    format!("/account/{}/project/{}/{}", USER, PROJECT, path)
}

pub fn simulation_fork(id: &str, rpc_url: &str, global_head: Option<&str>) -> Value {
    let mut fork = json!({
        "id": id,
        "block_number": 100,
        "transaction_index": 5,
        "accounts": {"0xaaa": "0xkey"},
        "rpc_url": rpc_url,
    });
    if let Some(head) = global_head {
        fork["global_head"] = json!(head);
    }
    fork
}
