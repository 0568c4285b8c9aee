//! Collaborator interfaces consumed from the host application.
//!
//! The editor never talks to the media center directly. It issues JSON-RPC
//! style queries through [`QueryService`] and asks the user through
//! [`Dialogs`]; both are injected by whoever embeds the editor.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::QueryError;

/// Request/response access to the host's library and PVR data.
pub trait QueryService {
    /// Run `method` and return the `result` member of the answer.
    fn call(&self, method: &str, params: Value) -> Result<Value, QueryError>;
}

/// Parameter builder for [`QueryService::call`].
#[derive(Clone, Debug, Default)]
pub struct QueryRequest {
    method: String,
    params: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Map::new(),
        }
    }

    pub fn properties(mut self, properties: &[&str]) -> Self {
        self.params.insert("properties".into(), json!(properties));
        self
    }

    pub fn limit(mut self, end: usize) -> Self {
        self.params
            .insert("limits".into(), json!({ "start": 0, "end": end }));
        self
    }

    pub fn sort(mut self, sort: Value) -> Self {
        self.params.insert("sort".into(), sort);
        self
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.params.insert("filter".into(), filter);
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn send(self, service: &dyn QueryService) -> Result<Value, QueryError> {
        let params = Value::Object(self.params);
        debug!(
            target: "home_menu_maker::host",
            method = %self.method,
            params = %params,
            "query"
        );
        service.call(&self.method, params)
    }

    /// Send and pull the array stored under `key` in the result.
    pub fn send_list(self, service: &dyn QueryService, key: &str) -> Result<Vec<Value>, QueryError> {
        let method = self.method.clone();
        let result = self.send(service)?;
        match result.get(key) {
            Some(Value::Array(items)) => Ok(items.clone()),
            // The host omits empty lists entirely.
            None => Ok(Vec::new()),
            Some(other) => Err(QueryError::Malformed {
                method,
                message: format!("expected array under '{key}', got {other}"),
            }),
        }
    }
}

/// Backend with no host attached: every request is unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineQuery;

impl QueryService for OfflineQuery {
    fn call(&self, method: &str, _params: Value) -> Result<Value, QueryError> {
        Err(QueryError::Unavailable(method.to_string()))
    }
}

/// Canned answers keyed by method name.
#[derive(Clone, Debug, Default)]
pub struct FixedQuery {
    answers: HashMap<String, Value>,
}

impl FixedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: &str, result: Value) -> Self {
        self.answers.insert(method.to_string(), result);
        self
    }
}

impl QueryService for FixedQuery {
    fn call(&self, method: &str, _params: Value) -> Result<Value, QueryError> {
        self.answers
            .get(method)
            .cloned()
            .ok_or_else(|| QueryError::Unavailable(method.to_string()))
    }
}

/// Answers read from `<dir>/<method>.json`, each holding a full JSON-RPC
/// response object.
#[derive(Clone, Debug)]
pub struct FileQuery {
    dir: PathBuf,
}

impl FileQuery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl QueryService for FileQuery {
    fn call(&self, method: &str, _params: Value) -> Result<Value, QueryError> {
        let path = self.dir.join(format!("{method}.json"));
        let data =
            fs::read_to_string(&path).map_err(|_| QueryError::Unavailable(method.to_string()))?;
        let response: Value =
            serde_json::from_str(&data).map_err(|err| QueryError::Malformed {
                method: method.to_string(),
                message: err.to_string(),
            })?;
        if let Some(error) = response.get("error") {
            return Err(QueryError::Rpc {
                method: method.to_string(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| QueryError::Malformed {
                method: method.to_string(),
                message: "missing result".into(),
            })
    }
}

/// Kind of numeric prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericKind {
    Number,
    /// `HH:MM`
    Time,
}

/// Modal prompts offered by the host. `None` means the user cancelled.
pub trait Dialogs {
    fn input(&mut self, heading: &str, default: &str) -> Option<String>;

    fn select(&mut self, heading: &str, options: &[String], preselect: Option<usize>)
        -> Option<usize>;

    fn multiselect(
        &mut self,
        heading: &str,
        options: &[String],
        preselect: &[usize],
    ) -> Option<Vec<usize>>;

    fn numeric(&mut self, heading: &str, default: &str, kind: NumericKind) -> Option<String>;

    fn yes_no(&mut self, heading: &str, message: &str) -> bool;

    fn ok(&mut self, heading: &str, message: &str);

    /// Pick an image file. Hosts without a file browser fall back to a text
    /// prompt.
    fn browse_image(&mut self, heading: &str, default: &str) -> Option<String> {
        self.input(heading, default)
    }
}

/// One scripted answer for [`ScriptedDialogs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    /// Answer to `input`, `numeric` or `browse_image`.
    Text(Option<String>),
    Select(Option<usize>),
    Multi(Option<Vec<usize>>),
    YesNo(bool),
}

/// Dialogs answered from a queue, for headless runs.
///
/// Each prompt consumes the next answer; a missing or mismatched answer counts
/// as a cancel. Headings are recorded in order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDialogs {
    answers: VecDeque<Answer>,
    pub headings: Vec<String>,
    pub notices: Vec<String>,
}

impl ScriptedDialogs {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, heading: &str) -> Option<Answer> {
        self.headings.push(heading.to_string());
        self.answers.pop_front()
    }
}

impl Dialogs for ScriptedDialogs {
    fn input(&mut self, heading: &str, _default: &str) -> Option<String> {
        match self.next(heading) {
            Some(Answer::Text(text)) => text,
            _ => None,
        }
    }

    fn select(&mut self, heading: &str, _options: &[String], _preselect: Option<usize>) -> Option<usize> {
        match self.next(heading) {
            Some(Answer::Select(index)) => index,
            _ => None,
        }
    }

    fn multiselect(
        &mut self,
        heading: &str,
        _options: &[String],
        _preselect: &[usize],
    ) -> Option<Vec<usize>> {
        match self.next(heading) {
            Some(Answer::Multi(indexes)) => indexes,
            _ => None,
        }
    }

    fn numeric(&mut self, heading: &str, _default: &str, _kind: NumericKind) -> Option<String> {
        match self.next(heading) {
            Some(Answer::Text(text)) => text,
            _ => None,
        }
    }

    fn yes_no(&mut self, heading: &str, _message: &str) -> bool {
        matches!(self.next(heading), Some(Answer::YesNo(true)))
    }

    fn ok(&mut self, heading: &str, message: &str) {
        self.notices.push(format!("{heading}: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_list_extracts_array_and_tolerates_missing_key() {
        let query = FixedQuery::new()
            .with("PVR.GetChannels", json!({ "channels": [{ "channelid": 1 }] }))
            .with("Addons.GetAddons", json!({ "limits": {} }));

        let channels = QueryRequest::new("PVR.GetChannels")
            .properties(&["icon"])
            .send_list(&query, "channels")
            .expect("channels should be returned");
        assert_eq!(channels.len(), 1);

        let addons = QueryRequest::new("Addons.GetAddons")
            .send_list(&query, "addons")
            .expect("missing list means empty");
        assert!(addons.is_empty());

        let err = QueryRequest::new("PVR.GetTimers")
            .send_list(&query, "timers")
            .expect_err("unknown method should fail");
        assert!(matches!(err, QueryError::Unavailable(_)));
    }

    struct Echo;

    impl QueryService for Echo {
        fn call(&self, method: &str, params: Value) -> Result<Value, QueryError> {
            Ok(json!({ "method": method, "params": params }))
        }
    }

    #[test]
    fn send_forwards_built_params() {
        let reply = QueryRequest::new("PVR.GetChannels")
            .properties(&["icon", "channelnumber"])
            .param("channelgroupid", "alltv")
            .send(&Echo)
            .expect("echo should answer");
        assert_eq!(reply["method"], "PVR.GetChannels");
        assert_eq!(reply["params"]["channelgroupid"], "alltv");
        assert_eq!(reply["params"]["properties"], json!(["icon", "channelnumber"]));
    }

    #[test]
    fn file_query_reads_result_and_error_objects() {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        fs::write(
            dir.path().join("PVR.GetChannels.json"),
            r#"{"jsonrpc": "2.0", "id": 1, "result": {"channels": []}}"#,
        )
        .expect("response should be written");
        fs::write(
            dir.path().join("Addons.GetAddons.json"),
            r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid params."}}"#,
        )
        .expect("response should be written");

        let query = FileQuery::new(dir.path());
        assert_eq!(
            query
                .call("PVR.GetChannels", Value::Null)
                .expect("result should be read"),
            json!({ "channels": [] })
        );
        assert!(matches!(
            query.call("Addons.GetAddons", Value::Null),
            Err(QueryError::Rpc { .. })
        ));
        assert!(matches!(
            query.call("VideoLibrary.GetMovies", Value::Null),
            Err(QueryError::Unavailable(_))
        ));
    }

    #[test]
    fn scripted_dialogs_treat_mismatches_as_cancel() {
        let mut dialogs = ScriptedDialogs::new([
            Answer::Select(Some(2)),
            Answer::YesNo(true),
            Answer::Text(Some("x".into())),
        ]);
        assert_eq!(dialogs.select("pick", &[], None), Some(2));
        assert_eq!(dialogs.input("name", ""), None);
        assert_eq!(dialogs.numeric("time", "00:00", NumericKind::Time), Some("x".into()));
        assert!(!dialogs.yes_no("sure", "?"));
        dialogs.ok("note", "done");
        assert_eq!(dialogs.headings, vec!["pick", "name", "time", "sure"]);
        assert_eq!(dialogs.notices, vec!["note: done"]);
        assert_eq!(dialogs.remaining(), 0);
    }
}
