use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dashmap::DashMap;
use rni::server::{DispatcherConfig, EndpointRegistry, RequestDispatcher};
use rni::{RniResult, rni_interface, rni_types};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Option<String>,
    pub name: String,
    pub age: u32,
    pub address: String,
}

rni_types! {
    Person = "demo.Person",
}

rni_interface! {
    /// A directory of people.
    pub trait PersonInterface(PersonInterfaceClient) {
        /// Store a person and return its new identifier.
        #[rni(name = "createPerson")]
        fn create_person(&self, person: Person) -> Option<String>;
        #[rni(name = "getPerson")]
        fn get_person(&self, id: String) -> Option<Person>;
        /// Look a person up by the identifier carried in the record.
        #[rni(name = "getPerson")]
        fn get_person_by_record(&self, person: Person) -> Option<Person>;
        #[rni(name = "getProperties")]
        fn get_properties(&self) -> HashMap<String, String>;
    }
}

#[derive(Debug, Default)]
struct PersonStore {
    people: DashMap<String, Person, ahash::RandomState>,
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
        Ok(HashMap::from([
            ("service".to_string(), "person-directory".to_string()),
            ("people".to_string(), self.people.len().to_string()),
        ]))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let host = env::var("RNI_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = match env::var("RNI_PORT") {
        Ok(port) => port.parse().context("RNI_PORT is not a valid port")?,
        Err(_) => 8080,
    };
    let context = env::var("RNI_CONTEXT").unwrap_or_else(|_| "rni".to_string());

    match env::args().nth(1).as_deref() {
        Some("server") => run_server(&host, port, &context).await,
        Some("client") => run_client(&host, port, &context).await,
        _ => bail!("usage: person <server|client>"),
    }
}

async fn run_server(host: &str, port: u16, context: &str) -> Result<()> {
    let registry = Arc::new(EndpointRegistry::new());
    registry.register(PersonInterface::export(Arc::new(PersonStore::default())))?;

    for endpoint in registry.endpoints() {
        info!(endpoint = %endpoint.key, signature = %endpoint.signature, "Serving");
    }

    let config = DispatcherConfig::builder()
        .path_prefix(format!("/{context}"))
        .build();
    let dispatcher = Arc::new(RequestDispatcher::new(registry, config));

    let listener = TcpListener::bind((host, port)).await?;
    rni::server::http::serve(listener, dispatcher).await?;
    Ok(())
}

async fn run_client(host: &str, port: u16, context: &str) -> Result<()> {
    let people = PersonInterfaceClient::connect(host, port, context)?;

    let mut person = Person {
        id: None,
        name: "rni".to_string(),
        age: 30,
        address: "github".to_string(),
    };

    let id = people
        .create_person(person.clone())
        .await?
        .context("server did not return an identifier")?;
    info!(id = %id, "Created person");

    let fetched = people.get_person(id.clone()).await?;
    info!(person = ?fetched, "Fetched by id");

    let unknown = people.get_person_by_record(person.clone()).await?;
    info!(person = ?unknown, "Fetched by record without id");

    person.id = Some(id);
    let known = people.get_person_by_record(person).await?;
    info!(person = ?known, "Fetched by record with id");

    let properties = people.get_properties().await?;
    info!(properties = ?properties, "Fetched properties");

    Ok(())
}
