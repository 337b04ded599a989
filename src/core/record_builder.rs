use crate::core::nested::{NestedTree, TreeNode};
use crate::domain::model::{AdditionalInfo, Address, FieldValue, Name, PersonRecord};
use crate::utils::error::{EtlError, Result};

const NAME_KEY: &str = "name";
const AGE_KEY: &str = "age";
const ADDRESS_KEY: &str = "address";

/// One data line, aligned positionally with the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

/// Parses a whole CSV document. The first failing row aborts the batch.
pub fn parse_csv(text: &str) -> Result<Vec<PersonRecord>> {
    // 不支援引號欄位，逗號一律視為分隔符
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    // 只含空白的行視同空行
    let mut rows = reader.records().filter(|row| match row {
        Ok(record) => !is_blank(record),
        Err(_) => true,
    });

    let header = match rows.next() {
        Some(header) => header?,
        None => {
            return Err(EtlError::malformed(
                "CSV must have at least header and one data row",
            ))
        }
    };
    let builder = RecordBuilder::new(header.iter());
    tracing::debug!("CSV header: {:?}", builder.headers());

    let mut people = Vec::new();
    for (index, row) in rows.enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(index + 2);
        people.push(builder.build_row(line, row.iter())?);
    }

    if people.is_empty() {
        return Err(EtlError::malformed(
            "CSV must have at least header and one data row",
        ));
    }

    tracing::debug!("Parsed {} records", people.len());
    Ok(people)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

#[derive(Debug, Clone)]
pub struct RecordBuilder {
    headers: Vec<String>,
}

impl RecordBuilder {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn from_header(line: &str) -> Self {
        Self::new(line.split(','))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn raw_row<I, S>(&self, line: usize, values: I) -> Result<RawRow>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .collect();

        if values.len() != self.headers.len() {
            return Err(EtlError::RowShapeMismatch {
                line,
                expected: self.headers.len(),
                found: values.len(),
            });
        }

        Ok(RawRow {
            line,
            fields: self.headers.iter().cloned().zip(values).collect(),
        })
    }

    pub fn build_row<I, S>(&self, line: usize, values: I) -> Result<PersonRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let row = self.raw_row(line, values)?;
        person_from_row(row)
    }
}

pub fn person_from_row(row: RawRow) -> Result<PersonRecord> {
    let line = row.line;
    let tree = NestedTree::from_flat(row.fields)?;
    record_from_tree(line, tree)
}

fn record_from_tree(line: usize, mut tree: NestedTree) -> Result<PersonRecord> {
    let first_name = tree.leaf_at("name.firstName").unwrap_or_default().to_string();
    let last_name = tree.leaf_at("name.lastName").unwrap_or_default().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(EtlError::validation(format!(
            "line {}: missing required fields (name.firstName and name.lastName must be non-empty)",
            line
        )));
    }

    let age = parse_age(line, tree.get(AGE_KEY))?;

    let address = match tree.remove(ADDRESS_KEY) {
        None => None,
        Some(TreeNode::Branch(branch)) => Some(address_from_tree(line, branch)),
        Some(TreeNode::Leaf(_)) => {
            return Err(EtlError::validation(format!(
                "line {}: 'address' must be written as address.<field> columns",
                line
            )))
        }
    };

    tree.remove(NAME_KEY);
    tree.remove(AGE_KEY);
    let extra: AdditionalInfo = tree.into();

    Ok(PersonRecord {
        name: Name {
            first_name,
            last_name,
        },
        age,
        address,
        additional_info: (!extra.is_empty()).then_some(extra),
    })
}

// 缺少、非整數、非正數分別回報
fn parse_age(line: usize, node: Option<&TreeNode>) -> Result<u32> {
    let raw = match node {
        Some(TreeNode::Leaf(value)) if !value.is_empty() => value.as_str(),
        Some(TreeNode::Leaf(_)) | None => {
            return Err(EtlError::validation(format!(
                "line {}: invalid age value (age is missing)",
                line
            )))
        }
        Some(TreeNode::Branch(_)) => {
            return Err(EtlError::validation(format!(
                "line {}: invalid age value (age cannot have nested columns)",
                line
            )))
        }
    };

    let age: i64 = raw.parse().map_err(|_| {
        EtlError::validation(format!(
            "line {}: invalid age value ('{}' is not an integer)",
            line, raw
        ))
    })?;

    if age <= 0 {
        return Err(EtlError::validation(format!(
            "line {}: invalid age value ({} must be positive)",
            line, age
        )));
    }

    u32::try_from(age).map_err(|_| {
        EtlError::validation(format!(
            "line {}: invalid age value ({} is out of range)",
            line, age
        ))
    })
}

// 已知欄位底下的巢狀欄位以點路徑放進 extra
fn address_from_tree(line: usize, tree: NestedTree) -> Address {
    let mut address = Address::default();
    for (key, node) in tree.into_entries() {
        let is_known = Address::is_known_field(&key);
        match node {
            TreeNode::Leaf(value) if is_known => {
                if let Some(slot) = address.known_field_mut(&key) {
                    *slot = Some(value);
                }
            }
            TreeNode::Branch(branch) if is_known => {
                tracing::debug!("line {}: address.{} has nested columns, kept as extra", line, key);
                for (path, value) in branch.flatten() {
                    address
                        .extra
                        .insert(format!("{}.{}", key, path), FieldValue::Text(value));
                }
            }
            node => {
                address.extra.insert(key, FieldValue::from(node));
            }
        }
    }
    address
}
