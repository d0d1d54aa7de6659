use std::fmt::Display;

use darc_key::sha256_concat;
use serde::{Deserialize, Serialize};

use crate::{
    DarcError, DarcId, DarcResult, DarcSignature, Expression, Identity, Request, Rules, Signer,
    EVOLVE_ACTION,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A versioned, signable access-control object.
///
/// A darc binds named actions to boolean expressions over identities. It is
/// immutable once its id is taken: changing who may do what means *evolving*
/// it, producing a new darc of the next version that embeds its predecessors
/// in [`DarcSignature::path`][path] and is signed by an identity the previous
/// version's evolution rule admits.
///
/// The id of a darc is the SHA-256 digest of its invariant fields (version,
/// description, base id, rules); the signature is excluded, so the id is
/// fixed before signing. The genesis darc's id doubles as the *base id*, the
/// stable name of the whole series, and is what darc-typed identities such as
/// `"darc:<hex>"` refer to.
///
/// Verification needs no storage for the series itself, since the full
/// history travels in the signature path. Storage enters only through the
/// `get_darc` lookup of [`Darc::verify_with`], which resolves darc-typed
/// identities named by evolution rules.
///
/// [path]: crate::DarcSignature::path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Darc {
    pub(crate) version: u64,
    pub(crate) description: Vec<u8>,
    pub(crate) base_id: Option<DarcId>,
    pub(crate) rules: Rules,
    pub(crate) signature: Option<DarcSignature>,
}

//--------------------------------------------------------------------------------------------------
// Methods: Construction and Identity
//--------------------------------------------------------------------------------------------------

impl Darc {
    /// Creates a genesis darc from its rules and a free-form description.
    ///
    /// The description is opaque to the core; it is covered by the id but
    /// never interpreted.
    pub fn new(rules: Rules, description: impl Into<Vec<u8>>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            base_id: None,
            rules,
            signature: None,
        }
    }

    /// Computes the id of this darc: the SHA-256 digest of version (8
    /// little-endian bytes), description, stored base id, and every
    /// `action || expression` pair in action name order.
    ///
    /// The signature and its path are not covered, so signing does not move
    /// the id.
    pub fn id(&self) -> DarcId {
        let version = self.version.to_le_bytes();

        let mut parts: Vec<&[u8]> = vec![&version, &self.description];
        if let Some(base_id) = &self.base_id {
            parts.push(base_id.as_bytes());
        }
        for (action, expr) in self.rules.iter() {
            parts.push(action.as_str().as_bytes());
            parts.push(expr.as_bytes());
        }

        DarcId::new(sha256_concat(parts))
    }

    /// Returns the id of the genesis darc of this series: the darc's own id
    /// at version 0, the stored base id afterwards.
    ///
    /// `None` only for a malformed non-genesis darc that lost its base id.
    pub fn base_id(&self) -> Option<DarcId> {
        if self.version == 0 {
            return Some(self.id());
        }
        self.base_id
    }

    /// Returns the darc-typed identity referring to this darc by its current
    /// id.
    pub fn identity(&self) -> Identity {
        Identity::Darc(self.id())
    }

    /// Returns the string form of [`Darc::identity`], `"darc:<hex(id)>"`.
    pub fn identity_string(&self) -> String {
        self.identity().to_string()
    }

    /// Clones the invariant fields and drops the signature. This is the form
    /// the id is computed over and the form shipped to other parties.
    pub fn unsigned_copy(&self) -> Darc {
        Darc {
            version: self.version,
            description: self.description.clone(),
            base_id: self.base_id,
            rules: self.rules.clone(),
            signature: None,
        }
    }

    /// Returns the version of this darc within its series.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the free-form description.
    pub fn description(&self) -> &[u8] {
        &self.description
    }

    /// Replaces the description. Only meaningful on a darc still being built;
    /// evolving re-signs whatever is set at that point.
    pub fn set_description(&mut self, description: impl Into<Vec<u8>>) {
        self.description = description.into();
    }

    /// Returns the rules of this darc.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns the rules for modification. Only meaningful on a darc still
    /// being built.
    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }

    /// Returns the embedded evolution signature, absent on a genesis darc.
    pub fn signature(&self) -> Option<&DarcSignature> {
        self.signature.as_ref()
    }

    /// Returns the darc that signed this one: the last element of the
    /// signature path. `None` when there is no signature (genesis), an error
    /// when the path is empty or its last element is not the direct
    /// predecessor.
    pub fn signer_darc(&self) -> DarcResult<Option<&Darc>> {
        let Some(signature) = &self.signature else {
            return Ok(None);
        };
        let Some(prev) = signature.path().last() else {
            return Err(DarcError::MissingField("signature path"));
        };
        if prev.version + 1 != self.version {
            return Err(DarcError::BrokenChain(format!(
                "not a clean evolution: version {} does not follow {}",
                self.version, prev.version
            )));
        }
        Ok(Some(prev))
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: Evolution and Verification
//--------------------------------------------------------------------------------------------------

impl Darc {
    /// Finalizes this darc as the next version of the series whose history is
    /// `path`, signed by `prev_owner`.
    ///
    /// `path` is ordered from the genesis darc to the current latest version;
    /// its last element is the predecessor this darc evolves from. The
    /// signature covers the new id and the concatenated path ids, and
    /// `prev_owner` must satisfy the predecessor's evolution rule for the
    /// result to verify.
    pub fn evolve(&mut self, path: &[Darc], prev_owner: &Signer) -> DarcResult<()> {
        let Some(prev) = path.last() else {
            return Err(DarcError::BrokenChain(
                "the evolution path cannot be empty".to_string(),
            ));
        };

        self.signature = None;
        self.version = prev.version + 1;
        self.base_id = prev.base_id();

        let signature = DarcSignature::new(prev_owner, self.id(), path)?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Verifies this darc without access to storage.
    ///
    /// Sufficient whenever no evolution rule along the chain delegates to
    /// another darc; a darc-typed identity cannot be resolved here and is
    /// treated as unsatisfied.
    pub fn verify(&self) -> DarcResult<()> {
        self.verify_with(|_| None)
    }

    /// Verifies this darc, resolving darc-typed identities through
    /// `get_darc`.
    ///
    /// A genesis darc verifies vacuously; it is the trust anchor of its
    /// series. Otherwise the embedded path must start at a genesis darc,
    /// every successive pair must be one correct evolution, and this darc
    /// must be one correct evolution of the last path element. An error names
    /// the first step that failed.
    ///
    /// `get_darc` maps an identity string `"darc:<hex>"` to the latest known
    /// darc of that series. Returning `None` leaves the corresponding term
    /// unsatisfied; it never aborts verification.
    pub fn verify_with<F>(&self, get_darc: F) -> DarcResult<()>
    where
        F: Fn(&str) -> Option<Darc>,
    {
        self.verify_chain(&get_darc)
    }

    fn verify_chain(&self, get_darc: &dyn Fn(&str) -> Option<Darc>) -> DarcResult<()> {
        if self.version == 0 {
            return Ok(());
        }

        let Some(signature) = &self.signature else {
            return Err(DarcError::MissingField("signature"));
        };
        if signature.path().is_empty() {
            return Err(DarcError::MissingField("signature path"));
        }

        let mut prev: Option<&Darc> = None;
        for (index, step) in signature.path().iter().enumerate() {
            match prev {
                None if step.version == 0 => {}
                None => {
                    return Err(DarcError::BrokenChain(
                        "the path does not start at a genesis darc".to_string(),
                    ))
                }
                Some(prev) => {
                    verify_one_evolution(step, prev, get_darc).map_err(|source| {
                        DarcError::EvolutionStep {
                            index,
                            source: Box::new(source),
                        }
                    })?;
                }
            }
            prev = Some(step);
        }

        let Some(prev) = self.signer_darc()? else {
            return Err(DarcError::MissingField("signature"));
        };
        verify_one_evolution(self, prev, get_darc)
    }

    /// Checks a request against this darc.
    ///
    /// The request must name this darc and a known action, every supplied
    /// signature must verify over the request hash against its identity, and
    /// the set of presented identity strings must satisfy the action's
    /// expression.
    pub fn check_request(&self, request: &Request) -> DarcResult<()> {
        if request.darc_id() != self.id() {
            return Err(DarcError::IdMismatch {
                request: request.darc_id().to_string(),
                darc: self.id().to_string(),
            });
        }

        let Some(expr) = self.rules.get(request.action()) else {
            return Err(DarcError::UnknownAction(request.action().as_str().to_string()));
        };

        if request.identities().len() != request.signatures().len() {
            return Err(DarcError::MissingField("signatures"));
        }

        let digest = request.hash();
        for (identity, signature) in request.identities().iter().zip(request.signatures()) {
            identity.verify(&digest, signature)?;
        }

        let ids = request.identity_strings();
        if !expr.matches(&ids)? {
            return Err(DarcError::Unauthorized {
                expr: expr.to_string(),
                ids,
            });
        }
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Verifies that `new` is one correct evolution of `prev`: same series, the
/// next version, signed over the new id and path by an identity satisfying
/// the predecessor's evolution rule.
fn verify_one_evolution(
    new: &Darc,
    prev: &Darc,
    get_darc: &dyn Fn(&str) -> Option<Darc>,
) -> DarcResult<()> {
    if new.base_id.is_none() {
        return Err(DarcError::MissingField("base id"));
    }
    if new.base_id() != prev.base_id() {
        return Err(DarcError::BrokenChain("base ids are not equal".to_string()));
    }
    if new.version != prev.version + 1 {
        return Err(DarcError::BrokenChain(format!(
            "incorrect version: expected {}, got {}",
            prev.version + 1,
            new.version
        )));
    }

    let Some(signature) = &new.signature else {
        return Err(DarcError::MissingField("signature"));
    };

    let signer = signature.signer().to_string();
    check_evolution_permission(prev.rules().evolution_expr(), get_darc, &[signer])?;

    let Some(base) = prev.base_id() else {
        return Err(DarcError::MissingField("base id"));
    };
    signature.verify(new.id().as_bytes(), base)
}

/// Checks that the signer identity strings satisfy an evolution expression,
/// resolving darc-typed terms through `get_darc`.
fn check_evolution_permission(
    expr: Option<&Expression>,
    get_darc: &dyn Fn(&str) -> Option<Darc>,
    signer_ids: &[String],
) -> DarcResult<()> {
    let Some(expr) = expr else {
        return Err(DarcError::MissingAction(EVOLVE_ACTION.to_string()));
    };

    let satisfied = expr.evaluate(|term| {
        if term.starts_with("darc:") {
            darc_term_satisfied(term, get_darc, signer_ids)
        } else {
            signer_ids.iter().any(|id| id == term)
        }
    })?;

    if !satisfied {
        return Err(DarcError::Unauthorized {
            expr: expr.to_string(),
            ids: signer_ids.to_vec(),
        });
    }
    Ok(())
}

/// Decides a darc-typed term: whether the signers are admitted by the series
/// the term delegates to.
///
/// The resolved darc must verify on its own and must contain the claimed
/// darc in its history (an unevolved darc is its own one-element history).
/// The latest evolution rule decides first; failing that, an ancestor at or
/// after the claimed darc may still authorize. Ancestors before the claimed
/// darc are irrelevant: they were superseded before the delegation named it.
fn darc_term_satisfied(
    term: &str,
    get_darc: &dyn Fn(&str) -> Option<Darc>,
    signer_ids: &[String],
) -> bool {
    let Some(darc) = get_darc(term) else {
        return false;
    };
    if darc.verify().is_err() {
        return false;
    }

    let in_history = match &darc.signature {
        Some(signature) => signature.path_contains(|d| d.identity_string() == term),
        None => darc.identity_string() == term,
    };
    if !in_history {
        return false;
    }

    if let Some(expr) = darc.rules().evolution_expr() {
        if expr.matches(signer_ids).unwrap_or(false) {
            return true;
        }
    }

    let Some(signature) = &darc.signature else {
        return false;
    };
    let mut reached = false;
    for ancestor in signature.path() {
        if ancestor.identity_string() == term {
            reached = true;
        }
        if !reached {
            continue;
        }
        let admitted = ancestor
            .rules()
            .evolution_expr()
            .map(|expr| expr.matches(signer_ids).unwrap_or(false));
        if admitted == Some(true) {
            return true;
        }
    }
    false
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for Darc {
    /// Two darcs are equal iff their ids are equal.
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Display for Darc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "id: {}", self.id())?;
        match self.base_id() {
            Some(base) => writeln!(f, "base: {}", base)?,
            None => writeln!(f, "base: <none>")?,
        }
        writeln!(f, "version: {}", self.version)?;
        write!(f, "rules:")?;
        for (action, expr) in self.rules.iter() {
            write!(f, "\n\t{} - \"{}\"", action, expr)?;
        }
        match &self.signature {
            Some(signature) => write!(f, "\nsignature: {}", hex::encode(signature.bytes()))?,
            None => write!(f, "\nsignature: <none>")?,
        }
        match self.signer_darc() {
            Ok(Some(signer)) => write!(f, "\nsigner darc: {}", signer.id()),
            Ok(None) => write!(f, "\nsigner darc: <none>"),
            Err(err) => write!(f, "\nsigner darc: <{}>", err),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
