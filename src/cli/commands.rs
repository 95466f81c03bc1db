//! CLI command implementations
//!
//! Each command loads the configuration, builds the schema and indexes from
//! it, reads one request from stdin and writes one response to stdout.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::index::IndexLog;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
use crate::planner::{CompiledExpression, ExplainPlan, PredicateSpec, QueryPlanner};
use crate::schema::{parse_record, Schema, SchemaDef, Value};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Column layout and index declarations (required)
    pub schema: SchemaDef,

    /// Records loaded into the indexes, in log order (optional)
    #[serde(default)]
    pub records: Vec<JsonValue>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;

        if self.schema.columns.is_empty() {
            return Err(CliError::config_error("schema must declare at least one column"));
        }

        self.schema.build()?;

        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }
}

/// Schema, indexes and records built from a configuration
#[derive(Debug)]
pub struct Store {
    schema: Schema,
    indexes: IndexLog,
    records: Vec<Vec<Value>>,
}

impl Store {
    /// Builds the schema, creates the declared indexes and loads the records.
    ///
    /// Record offsets are positions in the record list.
    pub fn open(config: &Config) -> CliResult<Self> {
        let mut schema = config.schema.build()?;
        let mut indexes = IndexLog::new();

        for (column, bucket_size) in config.schema.index_defs() {
            let id = indexes.add_index(&mut schema, column, bucket_size)?;

            let id = id.to_string();
            let bucket = bucket_size.to_string();
            log_event_with_fields(
                Event::IndexBuilt,
                &[
                    ("column", column),
                    ("index", id.as_str()),
                    ("bucket_size", bucket.as_str()),
                ],
            );
        }

        let mut records = Vec::with_capacity(config.records.len());
        for (offset, json) in config.records.iter().enumerate() {
            let record = parse_record(&schema, json)?;
            indexes.apply_record(&schema, &record, offset as u64)?;
            records.push(record);
        }

        Ok(Self {
            schema,
            indexes,
            records,
        })
    }

    /// Record schema with index state applied
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Index log
    pub fn indexes(&self) -> &IndexLog {
        &self.indexes
    }

    /// Records in log order
    pub fn records(&self) -> &[Vec<Value>] {
        &self.records
    }

    /// A planner over this store
    pub fn planner(&self) -> QueryPlanner<'_, IndexLog, [Vec<Value>]> {
        QueryPlanner::new(self.records.as_slice(), &self.indexes, &self.schema)
    }

    /// Binds a request of the form `{"expression": [[{field, op, value}, ...], ...]}`
    pub fn bind_request(&self, request: JsonValue) -> CliResult<CompiledExpression> {
        let request: PlanRequest = serde_json::from_value(request)
            .map_err(|e| CliError::invalid_request(e.to_string()))?;

        Ok(CompiledExpression::bind(&request.expression, &self.schema)?)
    }
}

/// Plan request body
#[derive(Debug, Clone, Deserialize)]
struct PlanRequest {
    expression: Vec<Vec<PredicateSpec>>,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures are
/// reported as a JSON error response before being returned.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);

    if let Err(e) = &result {
        write_error(e.code(), &e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Plan { config } => plan(&config),
        Command::Explain { config } => explain(&config),
    }
}

/// Plan one expression and print the scan operations
pub fn plan(config_path: &Path) -> CliResult<()> {
    let store = open_store(config_path)?;
    let request = read_request()?;
    write_response(plan_response(&store, request)?)
}

/// Plan one expression and print its explanation
pub fn explain(config_path: &Path) -> CliResult<()> {
    let store = open_store(config_path)?;
    let request = read_request()?;
    write_response(explain_response(&store, request)?)
}

fn open_store(config_path: &Path) -> CliResult<Store> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let path = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", path.as_str())]);

    Store::open(&config)
}

/// Response data for `plan`: operations, their text form and counters
pub fn plan_response(store: &Store, request: JsonValue) -> CliResult<JsonValue> {
    let expression = store.bind_request(request)?;
    let metrics = MetricsRegistry::new();
    let plan = store.planner().with_metrics(&metrics).plan(&expression)?;

    Ok(json!({
        "ops": plan.ops_json(),
        "plan": plan.to_string(),
        "metrics": metrics.snapshot(),
    }))
}

/// Response data for `explain`.
///
/// A planning error is explained rather than returned; request and
/// binding errors are still returned.
pub fn explain_response(store: &Store, request: JsonValue) -> CliResult<JsonValue> {
    let expression = store.bind_request(request)?;

    let explain = match store.planner().plan(&expression) {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(e) => ExplainPlan::from_error(&e),
    };

    let text = explain.to_string();
    Ok(json!({
        "explain": explain,
        "text": text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> JsonValue {
        json!({
            "log_level": "error",
            "schema": {
                "columns": [
                    { "name": "age", "type": "int", "min": 0, "max": 120, "index": { "bucket_size": 1 } },
                    { "name": "height", "type": "int", "min": 0, "max": 300, "index": { "bucket_size": 1 } },
                    { "name": "name", "type": "string", "size": 16 }
                ]
            },
            "records": [
                { "timestamp": 1, "age": 35, "height": 180, "name": "ann" },
                { "timestamp": 2, "age": 35, "height": 170, "name": "bob" },
                { "timestamp": 3, "age": 60, "height": 170, "name": "cat" }
            ]
        })
    }

    fn sample_store() -> Store {
        let config = Config::from_json(&sample_config().to_string()).unwrap();
        Store::open(&config).unwrap()
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tidelog.json");
        fs::write(&path, sample_config().to_string()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.severity().unwrap(), Severity::Error);
        assert_eq!(config.records.len(), 3);
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "TIDE_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_log_level_defaults_to_warn() {
        let config = Config::from_json(
            &json!({ "schema": { "columns": [{ "name": "a", "type": "int" }] } }).to_string(),
        )
        .unwrap();
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut bad_level = sample_config();
        bad_level["log_level"] = json!("loud");
        let err = Config::from_json(&bad_level.to_string()).unwrap_err();
        assert_eq!(err.code(), "TIDE_CLI_CONFIG_ERROR");

        let mut bad_type = sample_config();
        bad_type["schema"]["columns"][0]["type"] = json!("decimal");
        let err = Config::from_json(&bad_type.to_string()).unwrap_err();
        assert_eq!(err.code(), "TIDE_SCHEMA_INVALID_TYPE");

        let err = Config::from_json(&json!({ "schema": { "columns": [] } }).to_string()).unwrap_err();
        assert_eq!(err.code(), "TIDE_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_bad_record_rejected() {
        let mut config = sample_config();
        config["records"][0]["age"] = json!("old");
        let config = Config::from_json(&config.to_string()).unwrap();

        assert!(matches!(Store::open(&config), Err(CliError::Schema(_))));
    }

    #[test]
    fn test_store_indexes_records() {
        let store = sample_store();
        assert_eq!(store.indexes().len(), 2);
        assert_eq!(store.records().len(), 3);
        assert!(store.schema().column_by_name("age").unwrap().is_indexed());
    }

    #[test]
    fn test_plan_response_uses_cheapest_index() {
        let store = sample_store();

        // Two records have age 35, one has height 180.
        let request = json!({
            "expression": [[
                { "field": "age", "op": "==", "value": 35 },
                { "field": "height", "op": ">=", "value": 175 }
            ]]
        });
        let data = plan_response(&store, request).unwrap();

        assert_eq!(data["ops"], json!([{ "op": "index_range", "index": 1, "range": [175, 300] }]));
        assert_eq!(data["plan"], "[index_range(index=1, range=[175, 300])]");
        assert_eq!(data["metrics"]["plans_built"], 1);
    }

    #[test]
    fn test_plan_response_full_scan() {
        let store = sample_store();
        let request = json!({
            "expression": [
                [{ "field": "age", "op": "ge", "value": 30 }, { "field": "age", "op": "le", "value": 40 }],
                [{ "field": "name", "op": "==", "value": "bob" }]
            ]
        });

        let data = plan_response(&store, request).unwrap();
        assert_eq!(data["ops"], json!([{ "op": "full_scan" }]));
        assert_eq!(data["metrics"]["full_scan_fallbacks"], 1);
    }

    #[test]
    fn test_plan_response_rejects_bad_requests() {
        let store = sample_store();

        let err = plan_response(&store, json!({ "filter": [] })).unwrap_err();
        assert_eq!(err.code(), "TIDE_CLI_INVALID_REQUEST");

        let request = json!({ "expression": [[{ "field": "weight", "op": "==", "value": 1 }]] });
        let err = plan_response(&store, request).unwrap_err();
        assert_eq!(err.code(), "TIDE_PLAN_MALFORMED_PREDICATE");
    }

    #[test]
    fn test_explain_response() {
        let store = sample_store();
        let request = json!({
            "expression": [[{ "field": "age", "op": ">", "value": 10 }, { "field": "age", "op": "<", "value": 5 }]]
        });

        let data = explain_response(&store, request).unwrap();
        assert_eq!(data["explain"]["accepted"], true);
        assert_eq!(data["explain"]["strategy"], "EMPTY");
        assert!(data["text"].as_str().unwrap().contains("Status: ACCEPTED"));
    }
}
