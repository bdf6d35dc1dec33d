//! Recognize known build failures by the diagnostic codes in their output.

/// The SDK refused to publish because two inputs map to the same output file.
pub const DUPLICATE_OUTPUT_FILES_SIGNATURE: &str = "NETSDK1152";
/// The container registry rejected the push for lack of credentials.
pub const NO_REGISTRY_ACCESS_SIGNATURE: &str = "CONTAINER1016";
/// The container registry address could not be resolved or reached.
pub const UNKNOWN_REGISTRY_ADDRESS_SIGNATURE: &str = "CONTAINER1013";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildFailure {
    DuplicateOutputFiles,
    NoRegistryAccess,
    UnknownRegistryAddress,
    Unclassified,
}

/// Classify failed-build output, checking signatures in priority order.
///
/// Matching is case-insensitive.
pub fn classify(output: &str) -> BuildFailure {
    let output = output.to_ascii_uppercase();

    if output.contains(DUPLICATE_OUTPUT_FILES_SIGNATURE) {
        BuildFailure::DuplicateOutputFiles
    } else if output.contains(NO_REGISTRY_ACCESS_SIGNATURE) {
        BuildFailure::NoRegistryAccess
    } else if output.contains(UNKNOWN_REGISTRY_ADDRESS_SIGNATURE) {
        BuildFailure::UnknownRegistryAddress
    } else {
        BuildFailure::Unclassified
    }
}
