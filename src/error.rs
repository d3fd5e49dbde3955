use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K> {
    /// Fatal case, breaking one of the two LLRB rules.
    ConsecutiveReds,
    /// Fatal case, a red link leaning to the right.
    RightRed,
    /// Fatal case, root node is red after a completed mutation.
    RedRoot,
    /// Fatal case, breaking one of the two LLRB rules. The String
    /// component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    SortError(K, K),
    /// Fatal case, parent back-link of the node holding this key does
    /// not point to its owner.
    BrokenParent(K),
    /// Fatal case, (counted, tracked) number of entries disagree.
    CountMismatch(usize, usize),
    /// Returned by create() API when key is already present.
    OverwriteKey,
}

impl<K> fmt::Display for Error<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ConsecutiveReds => write!(f, "consecutive red links"),
            Error::RightRed => write!(f, "red link leaning right"),
            Error::RedRoot => write!(f, "root is red"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            Error::SortError(a, b) => write!(f, "sort error {:?} vs {:?}", a, b),
            Error::BrokenParent(key) => write!(f, "broken parent link at {:?}", key),
            Error::CountMismatch(n, m) => {
                write!(f, "counted {} entries, tracking {}", n, m)
            }
            Error::OverwriteKey => write!(f, "key already present"),
        }
    }
}

impl<K> error::Error for Error<K> where K: fmt::Debug {}
