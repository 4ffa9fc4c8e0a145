use super::checksum::crc16;
use super::field_codec::{FieldCodec, FieldTransform};
use super::IcdError;
use crate::uav::{TelemetryField, Unit};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// One field window of an ICD.
#[derive(Debug, PartialEq, Clone, serde::Serialize, serde::Deserialize)]
pub struct IcdField {
    field: TelemetryField,
    unit: Unit,
    min: f64,
    max: f64,
    offset: u32,
    length: u8,
}

impl IcdField {
    fn generate(field: TelemetryField, offset: u32) -> Self {
        let codec = FieldCodec::of(field);
        let (min, max) = codec.transform().value_range(codec.width());
        Self {
            field,
            unit: field.unit(),
            min,
            max,
            offset,
            length: codec.width(),
        }
    }

    pub fn field(&self) -> TelemetryField { self.field }

    pub fn unit(&self) -> Unit { self.unit }

    pub fn min(&self) -> f64 { self.min }

    pub fn max(&self) -> f64 { self.max }

    pub fn offset(&self) -> u32 { self.offset }

    pub fn length(&self) -> u8 { self.length }

    pub fn end(&self) -> u32 { self.offset + u32::from(self.length) }

    pub fn transform(&self) -> FieldTransform { FieldCodec::of(self.field).transform() }

    /// Encoded value of `value`, clamped to the declared range and bit window.
    pub fn encode(&self, value: f64) -> u64 {
        let clamped = if value.is_nan() { self.min } else { value.clamp(self.min, self.max) };
        self.transform().encode(clamped, self.length)
    }

    pub fn decode(&self, code: u64) -> Option<f64> { self.transform().decode(code) }

    fn validate(&self) -> Result<(), IcdError> {
        let transform = self.transform();
        if self.length < transform.min_width() || self.length > FieldCodec::MAX_WIDTH {
            return Err(IcdError::InvalidWidth(self.field));
        }
        if matches!(transform, FieldTransform::Checksum) && self.length != FieldCodec::CHECKSUM_BITS {
            return Err(IcdError::InvalidWidth(self.field));
        }
        if self.unit != self.field.unit() {
            return Err(IcdError::UnitMismatch(self.field));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(IcdError::InvalidRange(self.field));
        }
        Ok(())
    }
}

/// Ordered, contiguous field windows ending in a checksum field.
#[derive(Debug, PartialEq, Clone, serde::Serialize, serde::Deserialize)]
pub struct IcdLayout {
    name: String,
    fields: Vec<IcdField>,
}

impl IcdLayout {
    pub fn name(&self) -> &str { &self.name }

    pub fn fields(&self) -> &[IcdField] { &self.fields }

    pub fn field(&self, field: TelemetryField) -> Option<&IcdField> { self.fields.iter().find(|f| f.field == field) }

    pub fn total_bits(&self) -> usize { self.fields.last().map_or(0, |f| f.end() as usize) }

    pub fn checksum_field(&self) -> Option<&IcdField> {
        self.fields.last().filter(|f| f.field == TelemetryField::Checksum)
    }

    /// Identifies the wire shape of the layout. Layouts with the same field
    /// windows share a fingerprint regardless of their name.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fingerprint(&self) -> u16 {
        let mut bytes = Vec::with_capacity(self.fields.len() * 6);
        for f in &self.fields {
            bytes.push(f.field.index() as u8);
            bytes.extend_from_slice(&f.offset.to_le_bytes());
            bytes.push(f.length);
        }
        crc16(&bytes)
    }

    /// Checks contiguity, uniqueness, checksum placement and per-field widths.
    pub fn validate(&self) -> Result<(), IcdError> {
        if self.fields.is_empty() {
            return Err(IcdError::Empty);
        }
        if self.checksum_field().is_none() {
            return Err(IcdError::MissingChecksum);
        }
        let mut seen = HashSet::new();
        let mut expected_offset = 0;
        for f in &self.fields {
            if !seen.insert(f.field) {
                return Err(IcdError::DuplicateField(f.field));
            }
            if f.offset != expected_offset {
                return Err(IcdError::NotContiguous(f.field));
            }
            f.validate()?;
            expected_offset = f.end();
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, IcdError> {
        serde_json::to_string_pretty(self).map_err(|e| IcdError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, IcdError> {
        let layout: Self = serde_json::from_str(json).map_err(|e| IcdError::Serialization(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Writes the layout to `<dir>/<name>.json`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, IcdError> {
        fs::create_dir_all(dir).map_err(|e| IcdError::Io(format!("{}: {e}", dir.display())))?;
        let path = dir.join(format!("{}.json", self.name));
        fs::write(&path, self.to_json()?).map_err(|e| IcdError::Io(format!("{}: {e}", path.display())))?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, IcdError> {
        let content = fs::read_to_string(path).map_err(|e| IcdError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }
}

/// Generates layouts from the static per-field width table.
#[derive(Debug, Clone)]
pub struct IcdLayoutBuilder {
    name: String,
    selection: Option<HashSet<TelemetryField>>,
}

impl IcdLayoutBuilder {
    pub const NORTH: &'static str = "north";
    pub const SOUTH: &'static str = "south";

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            selection: None,
        }
    }

    /// Restricts the layout to `fields`. Order still follows the enumeration.
    pub fn with_fields(mut self, fields: &[TelemetryField]) -> Self {
        self.selection = Some(fields.iter().copied().collect());
        self
    }

    pub fn build(&self) -> IcdLayout {
        let mut fields = Vec::new();
        let mut offset = 0;
        let selected = TelemetryField::iter()
            .filter(|f| *f != TelemetryField::Checksum)
            .filter(|f| self.selection.as_ref().is_none_or(|s| s.contains(f)));
        for field in selected.chain(std::iter::once(TelemetryField::Checksum)) {
            let icd_field = IcdField::generate(field, offset);
            offset = icd_field.end();
            fields.push(icd_field);
        }
        IcdLayout {
            name: self.name.clone(),
            fields,
        }
    }
}

/// Layouts by name.
#[derive(Debug, Default, Clone)]
pub struct IcdCatalog {
    layouts: Vec<IcdLayout>,
}

impl IcdCatalog {
    pub fn new() -> Self { Self::default() }

    /// Adds `layout`, replacing a layout of the same name.
    pub fn insert(&mut self, layout: IcdLayout) {
        self.layouts.retain(|l| l.name != layout.name);
        self.layouts.push(layout);
    }

    pub fn get(&self, name: &str) -> Option<&IcdLayout> { self.layouts.iter().find(|l| l.name == name) }

    pub fn names(&self) -> Vec<&str> { self.layouts.iter().map(IcdLayout::name).collect() }

    pub fn len(&self) -> usize { self.layouts.len() }

    pub fn is_empty(&self) -> bool { self.layouts.is_empty() }

    /// Loads `<dir>/<name>.json` for every name.
    pub fn load_dir(dir: &Path, names: &[&str]) -> Result<Self, IcdError> {
        let mut catalog = Self::new();
        for name in names {
            catalog.insert(IcdLayout::load(&dir.join(format!("{name}.json")))?);
        }
        Ok(catalog)
    }
}
