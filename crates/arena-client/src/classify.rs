//! Classification of failed tool invocations.
//!
//! The tool has no structured error channel: a failure is a non-zero exit
//! plus free text. Every message this library recognizes lives in
//! [`MESSAGE_PATTERNS`], one row per (domain, operation, kind). A row's
//! template is rendered with the job's name and namespace and matched as a
//! substring of the captured output. Output that matches no row becomes a
//! generic [`ArenaError::OperationFailed`].
//!
//! The tests pin each template to the tool's current wording. If one of
//! them starts failing after a tool upgrade, the wording changed and the
//! table needs updating.

use arena_command::CommandError;
use tracing::warn;

use crate::config::DEFAULT_NAMESPACE;
use crate::error::{ArenaError, Domain, Operation};

/// Semantic outcome a message pattern maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The job already exists.
    AlreadyExists,
    /// The job does not exist.
    NotFound,
}

/// One recognized tool message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePattern {
    /// Domain the message is produced for.
    pub domain: Domain,
    /// Operation the message is produced by.
    pub operation: Operation,
    /// What the message means.
    pub kind: FailureKind,
    /// Message text; `{name}` and `{namespace}` are substituted.
    pub template: &'static str,
}

const ALREADY_EXISTS: &str = "the job {name} is already exist, please delete it first.";

/// Every message the client recognizes.
pub const MESSAGE_PATTERNS: &[MessagePattern] = &[
    MessagePattern {
        domain: Domain::Training,
        operation: Operation::Submit,
        kind: FailureKind::AlreadyExists,
        template: ALREADY_EXISTS,
    },
    MessagePattern {
        domain: Domain::Serving,
        operation: Operation::Submit,
        kind: FailureKind::AlreadyExists,
        template: ALREADY_EXISTS,
    },
    MessagePattern {
        domain: Domain::Evaluate,
        operation: Operation::Submit,
        kind: FailureKind::AlreadyExists,
        template: ALREADY_EXISTS,
    },
    MessagePattern {
        domain: Domain::Training,
        operation: Operation::Get,
        kind: FailureKind::NotFound,
        template: "Not found training job {name} in namespace {namespace},please use 'arena submit' to create it.",
    },
    MessagePattern {
        domain: Domain::Serving,
        operation: Operation::Get,
        kind: FailureKind::NotFound,
        template: "Not found serving job {name}, please check it with `arena serve list | grep {name}`",
    },
    MessagePattern {
        domain: Domain::Evaluate,
        operation: Operation::Get,
        kind: FailureKind::NotFound,
        template: "Not found evaluate job {name}, please check it with `arena serve list | grep {name}`",
    },
];

/// Values substituted into message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageContext<'a> {
    /// Job name.
    pub name: &'a str,
    /// Namespace the command ran against.
    pub namespace: &'a str,
}

impl<'a> MessageContext<'a> {
    /// Create a context. An empty namespace is the tool's `default` one.
    #[must_use]
    pub fn new(name: &'a str, namespace: &'a str) -> Self {
        let namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            namespace
        };
        Self { name, namespace }
    }
}

impl MessagePattern {
    /// The exact message expected for `ctx`.
    #[must_use]
    pub fn render(&self, ctx: &MessageContext<'_>) -> String {
        self.template
            .replace("{name}", ctx.name)
            .replace("{namespace}", ctx.namespace)
    }

    /// Whether `output` contains this message for `ctx`.
    #[must_use]
    pub fn matches(&self, ctx: &MessageContext<'_>, output: &str) -> bool {
        output.contains(&self.render(ctx))
    }
}

/// Find the semantic outcome of `output`, if any row recognizes it.
#[must_use]
pub fn classify(
    domain: Domain,
    operation: Operation,
    ctx: &MessageContext<'_>,
    output: &str,
) -> Option<FailureKind> {
    MESSAGE_PATTERNS
        .iter()
        .filter(|p| p.domain == domain && p.operation == operation)
        .find(|p| p.matches(ctx, output))
        .map(|p| p.kind)
}

/// Turn a failed invocation into the error the caller sees.
///
/// Only a non-zero exit is classified. Every other process error means the
/// tool never produced a verdict and is reported as
/// [`ArenaError::Execution`].
#[must_use]
pub fn classify_failure(
    domain: Domain,
    operation: Operation,
    ctx: &MessageContext<'_>,
    err: CommandError,
) -> ArenaError {
    let (output, exit_code) = match err {
        CommandError::ExitCode {
            output, exit_code, ..
        } => (output, exit_code),
        other => {
            warn!(%domain, %operation, error = %other, "command could not run");
            return ArenaError::execution(domain, operation, other);
        }
    };

    let message = output.trim().to_string();
    match classify(domain, operation, ctx, &message) {
        Some(FailureKind::AlreadyExists) => {
            warn!(%domain, job = ctx.name, "job already exists");
            ArenaError::already_exists(domain, ctx.name, message)
        }
        Some(FailureKind::NotFound) => ArenaError::not_found(domain, ctx.name),
        None => {
            warn!(%domain, %operation, exit_code, output = %message, "command failed");
            ArenaError::operation_failed(domain, operation, message)
        }
    }
}
