use crate::loader::RawFeatureRecord;
use crate::model::LoadError;

/// Anything that can hand over the upstream feature table.
pub trait TableSource {
    fn load(&self) -> Result<Vec<RawFeatureRecord>, LoadError>;
}
