/// Errors raised while recovering deleted material from a UBIFS instance.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error(transparent)]
    Fs(#[from] ubift_fs::FsError),

    #[error(transparent)]
    Ubi(#[from] ubift_ubi::UbiError),
}
