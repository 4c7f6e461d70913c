#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use rni::server::{DispatcherConfig, EndpointRegistry, RequestDispatcher};
use rni::{RniError, RniResult, rni_interface, rni_types};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const CONTEXT: &str = "rni";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Option<String>,
    pub name: String,
    pub age: u32,
    pub address: String,
}

impl Person {
    pub fn sample() -> Self {
        Self {
            id: None,
            name: "rni".to_string(),
            age: 30,
            address: "github".to_string(),
        }
    }
}

rni_types! {
    Person = "test.Person",
}

rni_interface! {
    pub trait PersonInterface(PersonInterfaceClient) {
        #[rni(name = "createPerson")]
        fn create_person(&self, person: Person) -> Option<String>;
        #[rni(name = "getPerson")]
        fn get_person(&self, id: String) -> Option<Person>;
        #[rni(name = "getPerson")]
        fn get_person_by_record(&self, person: Person) -> Option<Person>;
        #[rni(name = "getProperties")]
        fn get_properties(&self) -> HashMap<String, String>;
        fn forget(&self, id: String) -> ();
    }
}

#[derive(Debug, Default)]
pub struct PersonStore {
    people: DashMap<String, Person>,
}

impl PersonInterface for PersonStore {
    async fn create_person(&self, mut person: Person) -> RniResult<Option<String>> {
        let id = Uuid::new_v4().to_string();
        person.id = Some(id.clone());
        self.people.insert(id.clone(), person);
        Ok(Some(id))
    }

    async fn get_person(&self, id: String) -> RniResult<Option<Person>> {
        Ok(self.people.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_person_by_record(&self, person: Person) -> RniResult<Option<Person>> {
        Ok(person
            .id
            .and_then(|id| self.people.get(&id).map(|entry| entry.value().clone())))
    }

    async fn get_properties(&self) -> RniResult<HashMap<String, String>> {
        Ok(HashMap::from([(
            "people".to_string(),
            self.people.len().to_string(),
        )]))
    }

    async fn forget(&self, id: String) -> RniResult<()> {
        self.people.remove(&id);
        Ok(())
    }
}

rni_interface! {
    pub trait Echo(EchoClient) {
        fn echo(&self, value: String) -> String;
        #[rni(name = "echo")]
        fn echo_number(&self, value: i64) -> i64;
    }
}

pub struct EchoService;

impl Echo for EchoService {
    async fn echo(&self, value: String) -> RniResult<String> {
        Ok(value)
    }

    async fn echo_number(&self, value: i64) -> RniResult<i64> {
        Ok(value)
    }
}

rni_interface! {
    pub trait Flaky(FlakyClient) {
        fn fail(&self) -> String;
        #[rni(name = "fail")]
        fn fail_with(&self, reason: String) -> String;
    }
}

pub struct FlakyService;

impl Flaky for FlakyService {
    async fn fail(&self) -> RniResult<String> {
        Err(RniError::invocation(anyhow::anyhow!("always fails")))
    }

    async fn fail_with(&self, reason: String) -> RniResult<String> {
        Err(RniError::invocation(anyhow::anyhow!(reason)))
    }
}

/// Serve `registry` on an ephemeral local port.
pub async fn spawn_server(registry: Arc<EndpointRegistry>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let dispatcher = Arc::new(RequestDispatcher::new(registry, DispatcherConfig::default()));

    tokio::spawn(async move {
        rni::server::http::serve(listener, dispatcher).await.unwrap();
    });

    addr
}

/// Serve a plain axum app answering `200 OK` with an empty body to every request.
pub async fn spawn_empty_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().fallback(|| async { axum::http::StatusCode::OK });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
