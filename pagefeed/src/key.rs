#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::PageNumber;

#[cfg(feature = "std")]
pub(crate) type PageMap<V> = HashMap<PageNumber, V>;
#[cfg(not(feature = "std"))]
pub(crate) type PageMap<V> = BTreeMap<PageNumber, V>;
