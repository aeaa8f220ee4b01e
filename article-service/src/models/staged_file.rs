/// An article document written to staging storage, addressed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub filename: String,
    /// Where the backing store put it (absolute path for local storage).
    pub file_path: String,
}
