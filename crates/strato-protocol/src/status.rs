//! HTTP status code classification, per operation kind.
//!
//! Each operation kind carries its own rule table; unmapped codes classify
//! to [`Outcome::Unknown`], which callers must treat as "outcome
//! indeterminate, inspect the payload", never as success.

/// The kind of backend operation a response belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Load,
    Login,
    Logout,
    TokenUpdate,
    Payment,
    SocialLogin,
    FileCreate,
    FileLoad,
    ObjectModify,
}

/// Named outcome of a classified status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Created,
    Updated,
    NotModified,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    PayloadTooLarge,
    TooManyRequests,
    ServerError,
    Failed,
    Unknown,
}

impl Outcome {
    /// `true` for outcomes representing a successful exchange.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Created | Self::Updated)
    }
}

/// A single classification rule. Tables mix exact-match and closed-range
/// rules; both strategies evaluate uniformly, first match wins.
#[derive(Clone, Copy, Debug)]
enum Rule {
    Exact(u16, Outcome),
    Range(u16, u16, Outcome),
}

impl Rule {
    fn apply(self, code: u16) -> Option<Outcome> {
        match self {
            Self::Exact(expected, outcome) if code == expected => Some(outcome),
            Self::Range(lo, hi, outcome) if (lo..=hi).contains(&code) => Some(outcome),
            _ => None,
        }
    }
}

use Outcome::*;
use Rule::*;

const CREATE: &[Rule] = &[
    Exact(200, Success),
    Exact(201, Created),
    Exact(400, BadRequest),
    Exact(401, Unauthorized),
    Exact(403, Forbidden),
    Exact(409, Conflict),
    Exact(500, ServerError),
];

const LOAD: &[Rule] = &[
    Exact(200, Success),
    Exact(304, NotModified),
    Exact(401, Unauthorized),
    Exact(403, Forbidden),
    Exact(404, NotFound),
    Exact(500, ServerError),
];

const LOGIN: &[Rule] = &[
    Exact(200, Success),
    Exact(400, BadRequest),
    Exact(401, Unauthorized),
    Exact(403, Forbidden),
    Exact(429, TooManyRequests),
    Exact(500, ServerError),
];

const LOGOUT: &[Rule] = &[
    Exact(200, Success),
    Exact(204, Success),
    Exact(401, Unauthorized),
    Exact(500, ServerError),
];

const TOKEN_UPDATE: &[Rule] = &[
    Exact(200, Success),
    Exact(400, BadRequest),
    Exact(401, Unauthorized),
    Exact(403, Forbidden),
    Exact(500, ServerError),
];

// Payment classifies by range only; the 300..=500 range is closed, so 501
// falls through to Unknown.
const PAYMENT: &[Rule] = &[Range(200, 299, Success), Range(300, 500, Failed)];

// Social login lists exact codes but additionally accepts any unlisted 2xx
// as success. This is deliberately not unified with the strict exact-match
// tables used elsewhere.
const SOCIAL_LOGIN: &[Rule] = &[
    Exact(200, Success),
    Exact(400, BadRequest),
    Exact(401, Unauthorized),
    Exact(403, Forbidden),
    Exact(500, ServerError),
    Range(200, 299, Success),
];

const FILE_CREATE: &[Rule] = &[
    Exact(200, Success),
    Exact(201, Created),
    Exact(400, BadRequest),
    Exact(403, Forbidden),
    Exact(413, PayloadTooLarge),
    Exact(500, ServerError),
];

const FILE_LOAD: &[Rule] = &[
    Exact(200, Success),
    Exact(403, Forbidden),
    Exact(404, NotFound),
    Exact(500, ServerError),
];

const OBJECT_MODIFY: &[Rule] = &[
    Exact(200, Updated),
    Exact(201, Created),
    Exact(400, BadRequest),
    Exact(404, NotFound),
    Exact(409, Conflict),
    Exact(500, ServerError),
];

fn rules(kind: OperationKind) -> &'static [Rule] {
    match kind {
        OperationKind::Create => CREATE,
        OperationKind::Load => LOAD,
        OperationKind::Login => LOGIN,
        OperationKind::Logout => LOGOUT,
        OperationKind::TokenUpdate => TOKEN_UPDATE,
        OperationKind::Payment => PAYMENT,
        OperationKind::SocialLogin => SOCIAL_LOGIN,
        OperationKind::FileCreate => FILE_CREATE,
        OperationKind::FileLoad => FILE_LOAD,
        OperationKind::ObjectModify => OBJECT_MODIFY,
    }
}

/// Classify a status code for an operation kind. Unmapped codes are
/// [`Outcome::Unknown`].
pub fn classify(kind: OperationKind, code: u16) -> Outcome {
    rules(kind)
        .iter()
        .find_map(|rule| rule.apply(code))
        .unwrap_or(Outcome::Unknown)
}

/// `true` when the code classifies to a success outcome for the kind.
pub fn is_success(kind: OperationKind, code: u16) -> bool {
    classify(kind, code).is_success()
}
