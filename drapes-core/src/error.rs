/// Errors produced by the `drapes-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// No companion class is registered for the subject's exact runtime type.
    #[error("no {registry} companion registered for {subject_type}")]
    NoCompanion {
        registry: &'static str,
        subject_type: &'static str,
    },

    /// Neither the companion nor its subject exposes the requested member.
    #[error("neither {subject_type} nor {companion_type} has member '{member}'")]
    NoSuchMember {
        member: String,
        subject_type: &'static str,
        companion_type: &'static str,
    },
}
