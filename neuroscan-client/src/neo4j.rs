//! Neo4j HTTP transaction API client
//!
//! Statements are sent to the single-request commit endpoint
//! (`/db/{database}/tx/commit`) with basic auth. Neo4j reports Cypher errors
//! inside a 200 response, so those are surfaced as [`ClientError::QueryFailed`].

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ClientError, Result};
use crate::{handle_response, trim_base_url};

/// A Cypher statement with its parameters
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub statement: String,
    pub parameters: Map<String, Value>,
}

impl Statement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: Map::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: &'a [Statement],
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
    #[serde(default)]
    errors: Vec<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    code: String,
    message: String,
}

/// Rows returned by one statement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<QueryRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRow {
    pub row: Vec<Value>,
}

impl QueryResult {
    /// Values of the first column, as strings; null cells are skipped
    pub fn first_column_strings(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|r| r.row.first())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }
}

/// A labelled, named graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: String,
    pub name: String,
}

impl GraphNode {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
        }
    }
}

/// A directed relation between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: GraphNode,
    pub relation: String,
    pub target: GraphNode,
}

/// Client for one Neo4j database
#[derive(Debug, Clone)]
pub struct Neo4jClient {
    base_url: String,
    database: String,
    user: String,
    password: String,
    client: Client,
}

impl Neo4jClient {
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            database: database.into(),
            user: user.into(),
            password: password.into(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run statements in a single auto-committed transaction
    ///
    /// # Returns
    /// One result per statement, in order
    pub async fn run(&self, statements: &[Statement]) -> Result<Vec<QueryResult>> {
        let url = format!("{}/db/{}/tx/commit", self.base_url, self.database);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&CommitRequest { statements })
            .send()
            .await?;
        let body: CommitResponse = handle_response(response).await?;

        if let Some(err) = body.errors.first() {
            return Err(ClientError::QueryFailed(format!("{}: {}", err.code, err.message)));
        }

        Ok(body.results)
    }

    async fn run_one(&self, statement: Statement) -> Result<QueryResult> {
        self.run(std::slice::from_ref(&statement))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::ParseError("Missing statement result".to_string()))
    }

    /// Check the database answers queries
    pub async fn ping(&self) -> Result<()> {
        self.run_one(Statement::new("RETURN 1")).await.map(|_| ())
    }

    /// Treatments of every tumor whose name occurs in `text`, case-insensitive
    pub async fn treatments_matching(&self, text: &str) -> Result<Vec<String>> {
        let statement = Statement::new(
            "MATCH (g)-[:TREATED_BY]->(t) \
             WHERE g.name IS NOT NULL AND toLower($text) CONTAINS toLower(g.name) \
             RETURN DISTINCT t.name",
        )
        .param("text", text);

        Ok(self.run_one(statement).await?.first_column_strings())
    }

    /// Create the given edges, reusing nodes and relations that already exist
    pub async fn merge_edges(&self, edges: &[GraphEdge]) -> Result<()> {
        let statements = edges
            .iter()
            .map(merge_statement)
            .collect::<Result<Vec<_>>>()?;

        if statements.is_empty() {
            return Ok(());
        }

        self.run(&statements).await.map(|_| ())
    }

    /// Every relation in the database
    pub async fn edges(&self) -> Result<Vec<GraphEdge>> {
        let statement = Statement::new(
            "MATCH (a)-[r]->(b) \
             RETURN coalesce(labels(a)[0], ''), coalesce(a.name, ''), type(r), \
                    coalesce(labels(b)[0], ''), coalesce(b.name, '')",
        );
        let result = self.run_one(statement).await?;

        result
            .data
            .iter()
            .map(|row| {
                let cell = |i: usize| -> Result<String> {
                    row.row
                        .get(i)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| ClientError::ParseError(format!("Malformed edge row: {:?}", row.row)))
                };
                Ok(GraphEdge {
                    source: GraphNode::new(cell(0)?, cell(1)?),
                    relation: cell(2)?,
                    target: GraphNode::new(cell(3)?, cell(4)?),
                })
            })
            .collect()
    }
}

/// Labels and relation types cannot be parameters, so they are checked instead
fn identifier(value: &str) -> Result<&str> {
    let valid = !value.is_empty()
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !value.starts_with(|c: char| c.is_ascii_digit());

    if !valid {
        return Err(ClientError::QueryFailed(format!(
            "'{}' is not a valid label or relation type",
            value
        )));
    }
    Ok(value)
}

fn merge_statement(edge: &GraphEdge) -> Result<Statement> {
    let statement = format!(
        "MERGE (a:{} {{name: $source}}) MERGE (b:{} {{name: $target}}) MERGE (a)-[:{}]->(b)",
        identifier(&edge.source.label)?,
        identifier(&edge.target.label)?,
        identifier(&edge.relation)?,
    );

    Ok(Statement::new(statement)
        .param("source", json!(edge.source.name))
        .param("target", json!(edge.target.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_statement_interpolates_checked_identifiers() {
        let edge = GraphEdge {
            source: GraphNode::new("Tumor", "Glioblastoma"),
            relation: "TREATED_BY".to_string(),
            target: GraphNode::new("Treatment", "Surgery + Radiotherapy"),
        };

        let statement = merge_statement(&edge).unwrap();
        assert!(statement.statement.contains("MERGE (a:Tumor {name: $source})"));
        assert!(statement.statement.contains("-[:TREATED_BY]->"));
        assert_eq!(statement.parameters["target"], json!("Surgery + Radiotherapy"));
    }

    #[test]
    fn test_identifier_rejects_injection() {
        assert!(identifier("TREATED_BY").is_ok());
        assert!(identifier("X]->(b) DETACH DELETE b //").is_err());
        assert!(identifier("").is_err());
        assert!(identifier("1abc").is_err());
    }
}
