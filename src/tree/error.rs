use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TreeError {
    #[snafu(display("No such file or directory: {}", path))]
    NotFound { path: String },
    #[snafu(display("Path passes through a file: {}", path))]
    PathThroughFile { path: String },
    #[snafu(display("Invalid name: '{}'", name))]
    InvalidName { name: String },
    #[snafu(display("'{}' already exists in {}", name, parent))]
    DuplicateName { name: String, parent: String },
    #[snafu(display("The root directory has no parent"))]
    RootHasNoParent,
}
