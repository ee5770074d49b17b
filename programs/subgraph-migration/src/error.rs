use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;

/// Coarse classification of a [`MigrationError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Decode,
    InvalidState,
    InvalidArgument,
}

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum MigrationError {
    #[error("Only the token gateway can call this")]
    NotGateway = 0,

    #[error("Only the L1 counterpart can send this through the bridge")]
    NotL1Peer = 1,

    #[error("Must be authorized")]
    NotOwner = 2,

    #[error("Invalid message code")]
    InvalidCode = 3,

    #[error("Malformed callhook payload")]
    MalformedPayload = 4,

    #[error("Subgraph was not transferred from L1")]
    NotTransferred = 5,

    #[error("Subgraph transfer already finalized")]
    AlreadyFinalized = 6,

    #[error("Deployment ID must not be zero")]
    ZeroDeployment = 7,

    #[error("Insufficient token balance")]
    InsufficientBalance = 8,

    #[error("Curation deposit is below minimum required")]
    BelowMinimumDeposit = 9,

    #[error("Cannot deposit zero tokens")]
    ZeroTokens = 10,

    #[error("Slippage protection")]
    SlippageProtection = 11,

    #[error("Token amount does not fit the ledger")]
    AmountOverflow = 12,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 13,

    #[error("Token is not handled by this gateway")]
    UnknownToken = 14,

    #[error("Subgraph already exists")]
    SubgraphAlreadyExists = 15,

    #[error("Subgraph is disabled")]
    SubgraphDisabled = 16,

    #[error("Invalid configuration")]
    InvalidConfig = 17,

    #[error("Registry snapshot could not be decoded")]
    CorruptSnapshot = 18,

    #[error("Tokens were not sent to the registry")]
    WrongRecipient = 19,
}

impl MigrationError {
    pub fn kind(&self) -> ErrorKind {
        use MigrationError::*;
        match self {
            NotGateway | NotL1Peer | NotOwner => ErrorKind::Unauthorized,
            InvalidCode | MalformedPayload => ErrorKind::Decode,
            NotTransferred | AlreadyFinalized | SubgraphDisabled => ErrorKind::InvalidState,
            ZeroDeployment
            | InsufficientBalance
            | BelowMinimumDeposit
            | ZeroTokens
            | SlippageProtection
            | AmountOverflow
            | ArithmeticOverflow
            | UnknownToken
            | SubgraphAlreadyExists
            | InvalidConfig
            | CorruptSnapshot
            | WrongRecipient => ErrorKind::InvalidArgument,
        }
    }

    /// Stable numeric code, as reported to hosts.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }
}

impl From<MigrationError> for u32 {
    fn from(e: MigrationError) -> Self {
        e.code()
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;
