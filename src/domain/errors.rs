use std::fmt;

/// Raised when a PAC source cannot be turned into a runnable script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLoadError {
    Syntax(String),
    MissingEntryPoint,
    Initialization(String),
}

impl fmt::Display for ScriptLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptLoadError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ScriptLoadError::MissingEntryPoint => write!(f, "FindProxyForURL is not defined as a function"),
            ScriptLoadError::Initialization(msg) => write!(f, "top-level code failed: {}", msg),
        }
    }
}

/// Raised by a single `FindProxyForURL` invocation. Never changes evaluator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    NotLoaded,
    Runtime(String),
    NonStringResult(String),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::NotLoaded => write!(f, "no PAC script loaded"),
            EvaluationError::Runtime(msg) => write!(f, "script error: {}", msg),
            EvaluationError::NonStringResult(kind) => {
                write!(f, "FindProxyForURL returned {} instead of a string", kind)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveParseError {
    Empty,
    NoValidDirective(String),
}

impl fmt::Display for DirectiveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveParseError::Empty => write!(f, "empty proxy directive string"),
            DirectiveParseError::NoValidDirective(raw) => write!(f, "no valid proxy directive in {:?}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacError {
    ScriptLoad(ScriptLoadError),
    Evaluation(EvaluationError),
    DirectiveParse(DirectiveParseError),
    ResolutionFailed(String),
    InvalidUri(String),
    SourceLoad(String),
    Config(String),
}

impl PacError {
    pub fn is_load_error(&self) -> bool {
        matches!(self, PacError::ScriptLoad(_))
    }

    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, PacError::Evaluation(_))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, PacError::DirectiveParse(_))
    }
}

impl fmt::Display for PacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacError::ScriptLoad(e) => write!(f, "PAC script load failed: {}", e),
            PacError::Evaluation(e) => write!(f, "PAC evaluation failed: {}", e),
            PacError::DirectiveParse(e) => write!(f, "PAC result rejected: {}", e),
            PacError::ResolutionFailed(msg) => write!(f, "DNS resolution failed: {}", msg),
            PacError::InvalidUri(msg) => write!(f, "Invalid URI: {}", msg),
            PacError::SourceLoad(msg) => write!(f, "Cannot load PAC source: {}", msg),
            PacError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ScriptLoadError {}
impl std::error::Error for EvaluationError {}
impl std::error::Error for DirectiveParseError {}

impl std::error::Error for PacError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PacError::ScriptLoad(e) => Some(e),
            PacError::Evaluation(e) => Some(e),
            PacError::DirectiveParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScriptLoadError> for PacError {
    fn from(e: ScriptLoadError) -> Self {
        PacError::ScriptLoad(e)
    }
}

impl From<EvaluationError> for PacError {
    fn from(e: EvaluationError) -> Self {
        PacError::Evaluation(e)
    }
}

impl From<DirectiveParseError> for PacError {
    fn from(e: DirectiveParseError) -> Self {
        PacError::DirectiveParse(e)
    }
}

pub type Result<T> = std::result::Result<T, PacError>;
