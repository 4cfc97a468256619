use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::itn::Itn;

/// Which external capability a subscribe/unsubscribe request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionCode {
    CreditHistory,
    PublicService,
    Debts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionType {
    PublicServices,
}

impl SubscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::PublicServices => "PublicServices",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicServiceCode {
    CreditHistory,
    Debts,
}

impl PublicServiceCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicServiceCode::CreditHistory => "CreditHistory",
            PublicServiceCode::Debts => "Debts",
        }
    }
}

/// External source that issues subscription identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionSource {
    Ubch,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentifier(String);

impl UserIdentifier {
    pub fn parse(s: String) -> Result<UserIdentifier, UserIdentifierError> {
        if s.trim().is_empty() {
            Err(UserIdentifierError)
        } else {
            Ok(Self(s))
        }
    }

    /// Key under which an explicit subscription flag is recorded.
    pub fn subscription_key(&self) -> String {
        self.0.clone()
    }

    /// Key under which an automatic/implicit subscription flag is recorded,
    /// kept distinct from the explicit one.
    pub fn auto_subscription_key(&self) -> String {
        format!("{}-auto", self.0)
    }
}

impl AsRef<str> for UserIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("User identifier cannot be empty")]
pub struct UserIdentifierError;

/// Subscription identifier issued by an external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BureauSubscriptionId(String);

impl BureauSubscriptionId {
    pub fn new(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for BureauSubscriptionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

type PushFlags = HashMap<SubscriptionType, HashMap<PublicServiceCode, HashMap<String, bool>>>;
type Segments = HashMap<SubscriptionType, HashMap<PublicServiceCode, Vec<String>>>;

/// Persisted per-user subscription state.
///
/// Created lazily on the first subscription operation and only ever mutated by
/// applying a [`Modifier`]; an absent flag is equivalent to "not subscribed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub user_identifier: UserIdentifier,
    #[serde(default)]
    pub subscription_ids: HashMap<SubscriptionSource, BureauSubscriptionId>,
    #[serde(default)]
    pub push: PushFlags,
    #[serde(default)]
    pub segment: Segments,
}

impl SubscriptionRecord {
    pub fn empty(user_identifier: UserIdentifier) -> Self {
        Self {
            user_identifier,
            subscription_ids: HashMap::new(),
            push: HashMap::new(),
            segment: HashMap::new(),
        }
    }

    /// Deterministic initial shape for a user's first subscription operation:
    /// the credit history explicit flag starts cleared and the debts automatic
    /// flag is derived from a salted hash of the taxpayer number.
    pub fn bootstrap(
        user_identifier: UserIdentifier,
        itn: &Itn,
        itn_salt: &str,
        debts_auto_percent: u8,
    ) -> Self {
        let mut record = Self::empty(user_identifier);
        let explicit_key = record.user_identifier.subscription_key();
        let auto_key = record.user_identifier.auto_subscription_key();
        record.set_push_flag(
            SubscriptionType::PublicServices,
            PublicServiceCode::CreditHistory,
            explicit_key,
            false,
        );
        record.set_push_flag(
            SubscriptionType::PublicServices,
            PublicServiceCode::Debts,
            auto_key,
            debts_auto_opt_in(itn, itn_salt, debts_auto_percent),
        );
        record
    }

    pub fn push_flag(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        key: &str,
    ) -> bool {
        self.push
            .get(&subscription_type)
            .and_then(|services| services.get(&service_code))
            .and_then(|flags| flags.get(key))
            .copied()
            .unwrap_or(false)
    }

    pub fn subscription_id(&self, source: SubscriptionSource) -> Option<&BureauSubscriptionId> {
        self.subscription_ids.get(&source)
    }

    pub fn has_segment(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        segment_id: &str,
    ) -> bool {
        self.segment
            .get(&subscription_type)
            .and_then(|services| services.get(&service_code))
            .map(|segments| segments.iter().any(|s| s == segment_id))
            .unwrap_or(false)
    }

    /// Folds a declarative change set into the record.
    pub fn apply(&mut self, modifier: &Modifier) {
        for change in modifier.changes() {
            match change {
                FieldChange::SetPushFlag {
                    subscription_type,
                    service_code,
                    key,
                    value,
                } => {
                    self.set_push_flag(*subscription_type, *service_code, key.clone(), *value);
                }
                FieldChange::SetSubscriptionId { source, id } => {
                    self.subscription_ids.insert(*source, id.clone());
                }
                FieldChange::UnsetSubscriptionId { source } => {
                    self.subscription_ids.remove(source);
                }
                FieldChange::AddSegment {
                    subscription_type,
                    service_code,
                    segment_id,
                } => {
                    let segments = self
                        .segment
                        .entry(*subscription_type)
                        .or_default()
                        .entry(*service_code)
                        .or_default();
                    if !segments.iter().any(|s| s == segment_id) {
                        segments.push(segment_id.clone());
                    }
                }
                FieldChange::RemoveSegment {
                    subscription_type,
                    service_code,
                    segment_id,
                } => {
                    if let Some(segments) = self
                        .segment
                        .get_mut(subscription_type)
                        .and_then(|services| services.get_mut(service_code))
                    {
                        segments.retain(|s| s != segment_id);
                    }
                }
            }
        }
    }

    fn set_push_flag(
        &mut self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        key: String,
        value: bool,
    ) {
        self.push
            .entry(subscription_type)
            .or_default()
            .entry(service_code)
            .or_default()
            .insert(key, value);
    }
}

fn debts_auto_opt_in(itn: &Itn, salt: &str, percent: u8) -> bool {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(itn.as_ref().as_bytes())
        .finalize();
    let bucket = u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes")) % 100;
    bucket < u64::from(percent)
}

/// Declarative description of field-level changes to a [`SubscriptionRecord`].
///
/// Strategies produce one instead of mutating the record, keeping every
/// persistence side effect in the orchestrator's hands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modifier {
    changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    SetPushFlag {
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        key: String,
        value: bool,
    },
    SetSubscriptionId {
        source: SubscriptionSource,
        id: BureauSubscriptionId,
    },
    UnsetSubscriptionId {
        source: SubscriptionSource,
    },
    AddSegment {
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        segment_id: String,
    },
    RemoveSegment {
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        segment_id: String,
    },
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn set_push_flag(
        mut self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        key: String,
        value: bool,
    ) -> Self {
        self.changes.push(FieldChange::SetPushFlag {
            subscription_type,
            service_code,
            key,
            value,
        });
        self
    }

    pub fn set_subscription_id(
        mut self,
        source: SubscriptionSource,
        id: BureauSubscriptionId,
    ) -> Self {
        self.changes.push(FieldChange::SetSubscriptionId { source, id });
        self
    }

    pub fn unset_subscription_id(mut self, source: SubscriptionSource) -> Self {
        self.changes.push(FieldChange::UnsetSubscriptionId { source });
        self
    }

    pub fn add_segment(
        mut self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        segment_id: String,
    ) -> Self {
        self.changes.push(FieldChange::AddSegment {
            subscription_type,
            service_code,
            segment_id,
        });
        self
    }

    pub fn remove_segment(
        mut self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        segment_id: String,
    ) -> Self {
        self.changes.push(FieldChange::RemoveSegment {
            subscription_type,
            service_code,
            segment_id,
        });
        self
    }
}
