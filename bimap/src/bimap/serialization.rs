use serde::{Deserialize, Serialize};

use super::Bimap;
use crate::compare::Compare;

/// Serialized as a sequence of `(left, right)` pairs in left order.
impl<L, R, CL, CR> Serialize for Bimap<L, R, CL, CR>
where
    L: Serialize,
    R: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter_left())
    }
}

impl<'de, L, R, CL, CR> Deserialize<'de> for Bimap<L, R, CL, CR>
where
    L: Deserialize<'de>,
    R: Deserialize<'de>,
    CL: Compare<L> + Default,
    CR: Compare<R> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pairs = Vec::<(L, R)>::deserialize(deserializer)?;
        let mut bimap = Bimap::with_comparators(CL::default(), CR::default());
        for (left, right) in pairs {
            bimap
                .try_insert(left, right)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(bimap)
    }
}
