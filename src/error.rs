//! Errors reported by the checked container operations.

/// Failure of a checked operation. The container is left unmodified.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ContainerError {
    /// An index was outside the valid range for the operation.
    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds {
        /// The requested index.
        index: usize,
        /// The container length at the time of the call.
        len: usize,
    },

    /// A fixed-capacity container had no room for another element.
    #[error("container is full (capacity {capacity})")]
    Full {
        /// The fixed capacity.
        capacity: usize,
    },

    /// A cursor was used after the container it points into was
    /// structurally modified.
    #[error("stale cursor: taken at generation {cursor}, container is at generation {current}")]
    StaleCursor {
        /// Generation recorded in the cursor.
        cursor: u64,
        /// Current generation of the container.
        current: u64,
    },

    /// Storage handed to a view had an occupied slot after a vacant one.
    #[error("view storage is fragmented: slot {index} is occupied after a vacant slot")]
    FragmentedView {
        /// First occupied slot found after the occupied prefix.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::ContainerError;

    #[test]
    fn messages_name_the_offending_values() {
        let e = ContainerError::OutOfBounds { index: 9, len: 4 };
        assert_eq!(e.to_string(), "index 9 is out of bounds for length 4");
        let e = ContainerError::StaleCursor { cursor: 1, current: 3 };
        assert!(e.to_string().contains("generation 1"));
    }
}
