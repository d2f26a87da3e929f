mod common;

use common::{project_path, simulation_fork, tenderly, API_KEY};
use mockito::Matcher;
use oval_tenderly::{ForkAccount, ForkParams, TenderlyError};
use reqwest::StatusCode;
use serde_json::json;

const ADDRESS: &str = "0x2a111934d990668e705c85da0e976db06281ef0a";

#[tokio::test]
async fn create_fork_maps_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", project_path("fork").as_str())
        .match_header("x-access-key", API_KEY)
        .match_body(Matcher::Json(json!({
            "network_id": "1",
            "block_number": 100,
            "transaction_index": 5,
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "simulation_fork": simulation_fork("f1", "https://rpc/f1", None) }).to_string())
        .create_async()
        .await;

    let params = ForkParams {
        block_number: Some(100),
        tx_index: Some(5),
        ..ForkParams::new(1)
    };
    let fork = tenderly(&server).forks.create(&params).await.unwrap();

    assert_eq!(fork.id, "f1");
    assert_eq!(fork.block_number, 100);
    assert_eq!(fork.tx_index, 5);
    assert_eq!(
        fork.accounts,
        vec![ForkAccount {
            address: "0xaaa".to_string(),
            private_key: "0xkey".to_string(),
        }]
    );
    assert_eq!(fork.rpc_url, "https://rpc/f1");
    assert_eq!(fork.head_id, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn create_fork_takes_root_transaction_as_head() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", project_path("fork").as_str())
        .with_body(
            json!({
                "simulation_fork": simulation_fork("f1", "https://rpc/f1", None),
                "root_transaction": {"id": "0xdef"},
            })
            .to_string(),
        )
        .create_async()
        .await;

    let fork = tenderly(&server)
        .forks
        .create(&ForkParams::new(1))
        .await
        .unwrap();
    assert_eq!(fork.head_id.as_deref(), Some("0xdef"));
    mock.assert_async().await;
}

#[tokio::test]
async fn create_fork_rejects_tx_index_without_block_before_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let params = ForkParams {
        tx_index: Some(5),
        ..ForkParams::new(1)
    };
    let err = tenderly(&server).forks.create(&params).await.unwrap_err();
    assert!(matches!(err, TenderlyError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn create_fork_http_error_is_transport() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", project_path("fork").as_str())
        .with_status(400)
        .with_body(r#"{"error": {"message": "bad network"}}"#)
        .create_async()
        .await;

    let err = tenderly(&server)
        .forks
        .create(&ForkParams::new(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TenderlyError::Transport {
            status: Some(status),
            ..
        } if status == StatusCode::BAD_REQUEST
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn create_fork_unexpected_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", project_path("fork").as_str())
        .with_body(r#"{"simulation_fork": {"id": "f1"}}"#)
        .create_async()
        .await;

    let err = tenderly(&server)
        .forks
        .create(&ForkParams::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, TenderlyError::MalformedResponse { what: "fork", .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn get_fork_twice_returns_same_fork() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", project_path("fork/f1").as_str())
        .match_header("x-access-key", API_KEY)
        .with_body(json!({ "simulation_fork": simulation_fork("f1", "https://rpc/f1", Some("0xabc")) }).to_string())
        .expect(2)
        .create_async()
        .await;

    let forks = tenderly(&server).forks;
    let first = forks.get("f1").await.unwrap();
    let second = forks.get("f1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.head_id.as_deref(), Some("0xabc"));
    mock.assert_async().await;
}

#[tokio::test]
async fn share_and_unshare_fork() {
    let mut server = mockito::Server::new_async().await;
    let share = server
        .mock("POST", project_path("fork/f1/share").as_str())
        .match_header("x-access-key", API_KEY)
        .create_async()
        .await;
    let unshare = server
        .mock("POST", project_path("fork/f1/unshare").as_str())
        .match_header("x-access-key", API_KEY)
        .create_async()
        .await;

    let forks = tenderly(&server).forks;
    let url = forks.share("f1").await.unwrap();
    assert_eq!(url, format!("{}/shared/fork/f1/transactions", server.url()));
    forks.unshare("f1").await.unwrap();

    share.assert_async().await;
    unshare.assert_async().await;
}

#[tokio::test]
async fn delete_fork() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", project_path("fork/f1").as_str())
        .match_header("x-access-key", API_KEY)
        .with_status(204)
        .create_async()
        .await;

    tenderly(&server).forks.delete("f1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_missing_fork_is_transport() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", project_path("fork/gone").as_str())
        .with_status(404)
        .create_async()
        .await;

    let err = tenderly(&server).forks.delete("gone").await.unwrap_err();
    assert!(matches!(
        err,
        TenderlyError::Transport {
            status: Some(status),
            ..
        } if status == StatusCode::NOT_FOUND
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn set_balance_returns_new_head() {
    let mut server = mockito::Server::new_async().await;
    let rpc_url = format!("{}/rpc/f1", server.url());
    let get = server
        .mock("GET", project_path("fork/f1").as_str())
        .with_body(json!({ "simulation_fork": simulation_fork("f1", &rpc_url, Some("0xhead")) }).to_string())
        .expect(2)
        .create_async()
        .await;
    let rpc = server
        .mock("POST", "/rpc/f1")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "tenderly_setBalance",
            "params": [[ADDRESS], "0x3e8"],
        })))
        .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": "0x1234"}"#)
        .create_async()
        .await;

    let head = tenderly(&server)
        .forks
        .set_balance("f1", ADDRESS, "1000")
        .await
        .unwrap();
    assert_eq!(head, "0xhead");
    get.assert_async().await;
    rpc.assert_async().await;
}

#[tokio::test]
async fn set_balance_without_head_fails() {
    let mut server = mockito::Server::new_async().await;
    let rpc_url = format!("{}/rpc/f1", server.url());
    let get = server
        .mock("GET", project_path("fork/f1").as_str())
        .with_body(json!({ "simulation_fork": simulation_fork("f1", &rpc_url, None) }).to_string())
        .expect(2)
        .create_async()
        .await;
    let rpc = server
        .mock("POST", "/rpc/f1")
        .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": null}"#)
        .create_async()
        .await;

    let err = tenderly(&server)
        .forks
        .set_balance("f1", ADDRESS, "1000")
        .await
        .unwrap_err();
    assert!(matches!(err, TenderlyError::HeadNotFound(ref id) if id == "f1"));
    get.assert_async().await;
    rpc.assert_async().await;
}

#[tokio::test]
async fn set_balance_rpc_error_is_transport() {
    let mut server = mockito::Server::new_async().await;
    let rpc_url = format!("{}/rpc/f1", server.url());
    let _get = server
        .mock("GET", project_path("fork/f1").as_str())
        .with_body(json!({ "simulation_fork": simulation_fork("f1", &rpc_url, None) }).to_string())
        .create_async()
        .await;
    let _rpc = server
        .mock("POST", "/rpc/f1")
        .with_body(r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "invalid params"}}"#)
        .create_async()
        .await;

    let err = tenderly(&server)
        .forks
        .set_balance("f1", ADDRESS, "0x0")
        .await
        .unwrap_err();
    assert!(matches!(err, TenderlyError::Transport { status: None, .. }));
}

#[tokio::test]
async fn set_balance_validates_before_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let forks = tenderly(&server).forks;
    let err = forks.set_balance("f1", "0xaaa", "1000").await.unwrap_err();
    assert!(matches!(err, TenderlyError::Validation(ref msg) if msg.contains("account")));
    let err = forks.set_balance("f1", ADDRESS, "-5").await.unwrap_err();
    assert!(matches!(err, TenderlyError::Validation(_)));
    let err = forks.set_balance("f1", ADDRESS, "1_000").await.unwrap_err();
    assert!(matches!(err, TenderlyError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn find_fork_by_description() {
    let mut server = mockito::Server::new_async().await;
    let mut described = simulation_fork("f2", "https://rpc/f2", Some("0xabc"));
    described["description"] = json!("Generated: regular borrow");
    let mut other = simulation_fork("f1", "https://rpc/f1", None);
    other["description"] = json!("Generated: oval borrow");
    let mock = server
        .mock("GET", project_path("forks").as_str())
        .match_header("x-access-key", API_KEY)
        .with_body(json!({ "simulation_forks": [other, described] }).to_string())
        .expect(2)
        .create_async()
        .await;

    let forks = tenderly(&server).forks;
    let found = forks
        .find_by_description("Generated: regular borrow")
        .await
        .unwrap()
        .expect("fork is listed");
    assert_eq!(found.id, "f2");
    assert_eq!(found.head_id.as_deref(), Some("0xabc"));

    let missing = forks.find_by_description("Generated: nothing").await.unwrap();
    assert_eq!(missing, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn find_fork_in_malformed_list_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", project_path("forks").as_str())
        .with_body(json!({ "simulation_forks": [{"id": "f1"}] }).to_string())
        .create_async()
        .await;

    let err = tenderly(&server)
        .forks
        .find_by_description("anything")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TenderlyError::MalformedResponse {
            what: "fork list",
            ..
        }
    ));
}

#[tokio::test]
async fn set_simulation_description() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", project_path("fork/f1/transaction/s1").as_str())
        .match_header("x-access-key", API_KEY)
        .match_body(Matcher::Json(json!({"description": "borrowCall"})))
        .create_async()
        .await;

    tenderly(&server)
        .forks
        .set_simulation_description("f1", "s1", "borrowCall")
        .await
        .unwrap();
    mock.assert_async().await;
}
