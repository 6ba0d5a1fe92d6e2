//! Scripted executor for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use arena_command::{CommandError, CommandExecutor, ExecuteFuture};

use crate::client::ArenaClient;
use crate::config::ClientConfig;

/// Returns queued results in order and records every argument vector.
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    responses: Mutex<VecDeque<Result<String, CommandError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(self, output: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(output.to_string()));
        self
    }

    pub(crate) fn fail(self, exit_code: i32, output: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(CommandError::exit_code("arena", exit_code, output)));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last_call(&self) -> Vec<String> {
        self.calls().pop().unwrap_or_default()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecuteFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(argv.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        })
    }
}

/// A client over `executor` with quiet, predictable global flags.
pub(crate) fn client(executor: &Arc<RecordingExecutor>) -> ArenaClient {
    let config = ClientConfig::default()
        .with_log_level("")
        .with_arena_namespace("");
    ArenaClient::with_executor(config, Arc::clone(executor) as Arc<dyn CommandExecutor>)
}
