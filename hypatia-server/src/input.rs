//! Request shapes and input normalization
//!
//! The wire format is deliberately polymorphic: a group can arrive as a
//! raw array, as `{size, mean, std_dev|std_err}` summary, or (for the
//! two-sample Z and paired endpoints) as a long-format record table that
//! must pivot to exactly two columns. All of that is resolved here, once,
//! into the normalized shapes the engines accept. Errors are classified
//! with the same taxonomy the engines use so the transport mapping is
//! uniform.

use hypatia_core::{
    Alternative, DiagnosticFlags, GroupData, ProportionGroup, StatError, StatResult,
    SummaryStats, TestOptions,
};
use serde::Deserialize;
use serde_json::Value;

// ============ Shared option fields ============

/// Option fields common to every endpoint body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub alternative: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub diagnostics: Option<DiagnosticFlags>,
    #[serde(default)]
    pub power: Option<bool>,
}

impl RequestOptions {
    /// Resolve against a family's default flag set.
    pub fn resolve(&self, default_flags: DiagnosticFlags) -> StatResult<TestOptions> {
        let alternative = match &self.alternative {
            Some(token) => Alternative::parse(token)?,
            None => Alternative::TwoSided,
        };
        let options = TestOptions {
            alternative,
            confidence_level: self.confidence_level.unwrap_or(0.95),
            alpha: self.alpha.unwrap_or(0.05),
            diagnostics: self.diagnostics.unwrap_or(default_flags),
            power: self.power.unwrap_or(false),
        };
        options.validate()?;
        Ok(options)
    }
}

// ============ Generic value coercion ============

fn as_number(value: &Value, field: &str) -> StatResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| StatError::invalid_type(format!("{field} is not a finite number"))),
        other => Err(StatError::invalid_type(format!(
            "{field} must be a number, got {}",
            json_type(other)
        ))),
    }
}

fn as_size(value: &Value, field: &str) -> StatResult<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as usize).ok_or_else(|| {
            StatError::invalid_type(format!("{field} must be a non-negative integer"))
        }),
        other => Err(StatError::invalid_type(format!(
            "{field} must be an integer, got {}",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A JSON array of numbers, strictly typed.
pub fn parse_numeric_array(value: &Value, field: &str) -> StatResult<Vec<f64>> {
    let items = value.as_array().ok_or_else(|| {
        StatError::invalid_type(format!(
            "{field} must be an array of numbers, got {}",
            json_type(value)
        ))
    })?;
    items
        .iter()
        .map(|item| as_number(item, field))
        .collect()
}

/// One group: raw array or `{size, mean, std_dev|std_err}` summary.
pub fn parse_group(value: &Value, field: &str) -> StatResult<GroupData> {
    match value {
        Value::Array(_) => Ok(GroupData::Raw(parse_numeric_array(value, field)?)),
        Value::Object(map) => {
            let size = as_size(
                map.get("size")
                    .ok_or_else(|| StatError::missing_field(format!("{field}.size")))?,
                "size",
            )?;
            let mean = as_number(
                map.get("mean")
                    .ok_or_else(|| StatError::missing_field(format!("{field}.mean")))?,
                "mean",
            )?;
            let std_dev = map
                .get("std_dev")
                .map(|v| as_number(v, "std_dev"))
                .transpose()?;
            let std_err = map
                .get("std_err")
                .map(|v| as_number(v, "std_err"))
                .transpose()?;
            Ok(GroupData::Summary(SummaryStats {
                size,
                mean,
                std_dev,
                std_err,
            }))
        }
        other => Err(StatError::invalid_type(format!(
            "{field} must be an array or a summary object, got {}",
            json_type(other)
        ))),
    }
}

// ============ Two-proportion Z ============

#[derive(Debug, Clone, Deserialize)]
pub struct ProportionZRequest {
    #[serde(default, alias = "Alpha_value")]
    pub alpha: Option<f64>,
    #[serde(default, alias = "Yates_correction")]
    pub yates_correction: Option<i64>,
    #[serde(default, alias = "Confidence_level")]
    pub confidence_level: Option<f64>,
    #[serde(default, alias = "Data", alias = "groups")]
    pub data: Option<Value>,
}

#[derive(Debug)]
pub struct NormalizedProportionZ {
    pub group1: ProportionGroup,
    pub group2: ProportionGroup,
    pub yates_correction: u8,
    pub options: TestOptions,
}

impl ProportionZRequest {
    pub fn normalize(&self) -> StatResult<NormalizedProportionZ> {
        let yates = self.yates_correction.unwrap_or(0);
        if !(0..=1).contains(&yates) {
            return Err(StatError::validation(
                "Yates_correction must be either 0 or 1.",
            ));
        }

        let data = self
            .data
            .as_ref()
            .ok_or_else(|| StatError::missing_field("Data"))?;
        let rows = data.as_array().ok_or_else(|| {
            StatError::invalid_type("Data must be an array of two groups")
        })?;
        if rows.len() != 2 {
            return Err(StatError::validation(
                "Data must contain two rows and two columns.",
            ));
        }

        let parse_row = |row: &Value| -> StatResult<ProportionGroup> {
            match row {
                // original wire shape: [size, proportion]
                Value::Array(pair) if pair.len() == 2 => Ok(ProportionGroup {
                    size: as_size(&pair[0], "size")?,
                    proportion: as_number(&pair[1], "proportion")?,
                }),
                Value::Array(_) => Err(StatError::validation(
                    "Data must contain two rows and two columns.",
                )),
                Value::Object(map) => Ok(ProportionGroup {
                    size: as_size(
                        map.get("size")
                            .ok_or_else(|| StatError::missing_field("size"))?,
                        "size",
                    )?,
                    proportion: as_number(
                        map.get("proportion")
                            .ok_or_else(|| StatError::missing_field("proportion"))?,
                        "proportion",
                    )?,
                }),
                other => Err(StatError::invalid_type(format!(
                    "group must be a [size, proportion] pair or object, got {}",
                    json_type(other)
                ))),
            }
        };

        let shared = RequestOptions {
            alpha: self.alpha,
            confidence_level: self.confidence_level,
            ..Default::default()
        };

        Ok(NormalizedProportionZ {
            group1: parse_row(&rows[0])?,
            group2: parse_row(&rows[1])?,
            yates_correction: yates as u8,
            options: shared.resolve(DiagnosticFlags::none())?,
        })
    }
}

// ============ Two-sample Z (long format) ============

#[derive(Debug, Clone, Deserialize)]
pub struct TwoSampleZRequest {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub group_column: Option<String>,
    #[serde(default, alias = "confidence")]
    pub confidence_level: Option<f64>,
    #[serde(default)]
    pub alternative: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug)]
pub struct NormalizedTwoSampleZ {
    pub group1: Vec<f64>,
    pub group2: Vec<f64>,
    pub labels: (String, String),
    pub grouping_variable: String,
    pub options: TestOptions,
}

/// Render a label cell: strings stay as-is, numbers print canonically.
fn label_of(value: &Value) -> StatResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(StatError::invalid_type(format!(
            "group label must be a scalar, got {}",
            json_type(other)
        ))),
    }
}

impl TwoSampleZRequest {
    pub fn normalize(&self) -> StatResult<NormalizedTwoSampleZ> {
        let column = self
            .column
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                StatError::validation("Both 'column' and 'group_column' are required.")
            })?;
        let group_column = self
            .group_column
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                StatError::validation("Both 'column' and 'group_column' are required.")
            })?;

        let records = self
            .data
            .as_ref()
            .and_then(Value::as_array)
            .ok_or_else(|| StatError::missing_field("data"))?;

        // pivot long-format records into per-label columns, keeping the
        // order in which labels first appear
        let mut labels: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();
        for record in records {
            let map = record.as_object().ok_or_else(|| {
                StatError::invalid_type("each data record must be an object")
            })?;
            let label = label_of(
                map.get(group_column)
                    .ok_or_else(|| StatError::missing_field(group_column))?,
            )?;
            let value = as_number(
                map.get(column)
                    .ok_or_else(|| StatError::missing_field(column))?,
                column,
            )?;

            match labels.iter().position(|l| l == &label) {
                Some(idx) => columns[idx].push(value),
                None => {
                    labels.push(label);
                    columns.push(vec![value]);
                }
            }
        }

        if labels.len() != 2 {
            return Err(StatError::validation("Ensure exactly two groups."));
        }

        let shared = RequestOptions {
            alternative: self.alternative.clone(),
            confidence_level: self.confidence_level,
            ..Default::default()
        };
        let group2 = columns.pop().unwrap_or_default();
        let group1 = columns.pop().unwrap_or_default();
        let label2 = labels.pop().unwrap_or_default();
        let label1 = labels.pop().unwrap_or_default();

        Ok(NormalizedTwoSampleZ {
            group1,
            group2,
            labels: (label1, label2),
            grouping_variable: group_column.to_string(),
            options: shared.resolve(DiagnosticFlags::none())?,
        })
    }
}

// ============ One-sample t ============

#[derive(Debug, Clone, Deserialize)]
pub struct OneSampleTRequest {
    #[serde(default)]
    pub sample: Option<Value>,
    #[serde(default)]
    pub population_mean: Option<f64>,
    #[serde(flatten)]
    pub options: RequestOptions,
}

#[derive(Debug)]
pub struct NormalizedOneSampleT {
    pub sample: GroupData,
    pub population_mean: f64,
    pub options: TestOptions,
}

impl OneSampleTRequest {
    pub fn normalize(&self) -> StatResult<NormalizedOneSampleT> {
        let sample = self
            .sample
            .as_ref()
            .ok_or_else(|| StatError::missing_field("sample"))?;
        Ok(NormalizedOneSampleT {
            sample: parse_group(sample, "sample")?,
            population_mean: self.population_mean.unwrap_or(0.0),
            options: self.options.resolve(DiagnosticFlags::default())?,
        })
    }
}

// ============ Two-sample t ============

#[derive(Debug, Clone, Deserialize)]
pub struct TwoSampleTRequest {
    #[serde(default)]
    pub groups: Option<Value>,
    #[serde(flatten)]
    pub options: RequestOptions,
}

#[derive(Debug)]
pub struct NormalizedTwoSampleT {
    pub group1: GroupData,
    pub group2: GroupData,
    pub labels: (String, String),
    pub options: TestOptions,
}

impl TwoSampleTRequest {
    pub fn normalize(&self) -> StatResult<NormalizedTwoSampleT> {
        let groups = self
            .groups
            .as_ref()
            .ok_or_else(|| StatError::missing_field("groups"))?
            .as_object()
            .ok_or_else(|| {
                StatError::invalid_type("groups must be an object of two named groups")
            })?;

        if groups.len() != 2 {
            return Err(StatError::validation(
                "JSON input must contain exactly two groups.",
            ));
        }

        // serde_json objects iterate in key order, so the pairing is
        // deterministic regardless of wire order
        let mut entries = groups.iter();
        let (name1, value1) = entries.next().ok_or_else(|| {
            StatError::validation("JSON input must contain exactly two groups.")
        })?;
        let (name2, value2) = entries.next().ok_or_else(|| {
            StatError::validation("JSON input must contain exactly two groups.")
        })?;

        Ok(NormalizedTwoSampleT {
            group1: parse_group(value1, name1)?,
            group2: parse_group(value2, name2)?,
            labels: (name1.clone(), name2.clone()),
            options: self.options.resolve(DiagnosticFlags::default())?,
        })
    }
}

// ============ Paired t ============

#[derive(Debug, Clone, Deserialize)]
pub struct PairedTRequest {
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
    /// Long-format alternative: records of {subject, treatment, value}
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub options: RequestOptions,
}

#[derive(Debug)]
pub struct NormalizedPairedT {
    pub before: Vec<f64>,
    pub after: Vec<f64>,
    pub options: TestOptions,
}

impl PairedTRequest {
    pub fn normalize(&self) -> StatResult<NormalizedPairedT> {
        let options = self.options.resolve(DiagnosticFlags::default())?;

        if let (Some(before), Some(after)) = (&self.before, &self.after) {
            return Ok(NormalizedPairedT {
                before: parse_numeric_array(before, "before")?,
                after: parse_numeric_array(after, "after")?,
                options,
            });
        }

        let records = self
            .data
            .as_ref()
            .and_then(Value::as_array)
            .ok_or_else(|| {
                StatError::missing_field("either 'before'/'after' arrays or a 'data' table")
            })?;

        let (before, after) = pivot_paired_records(records)?;
        Ok(NormalizedPairedT {
            before,
            after,
            options,
        })
    }
}

// Pivot {subject, treatment, value} records into two aligned columns.
// The first treatment label to appear is the "before" column.
fn pivot_paired_records(records: &[Value]) -> StatResult<(Vec<f64>, Vec<f64>)> {
    let mut treatments: Vec<String> = Vec::new();
    let mut subjects: Vec<String> = Vec::new();
    let mut cells: Vec<[Option<f64>; 2]> = Vec::new();

    for record in records {
        let map = record
            .as_object()
            .ok_or_else(|| StatError::invalid_type("each data record must be an object"))?;
        let subject = label_of(
            map.get("subject")
                .ok_or_else(|| StatError::missing_field("subject"))?,
        )?;
        let treatment = label_of(
            map.get("treatment")
                .ok_or_else(|| StatError::missing_field("treatment"))?,
        )?;
        let value = as_number(
            map.get("value")
                .ok_or_else(|| StatError::missing_field("value"))?,
            "value",
        )?;

        let t_idx = match treatments.iter().position(|t| t == &treatment) {
            Some(idx) => idx,
            None => {
                treatments.push(treatment);
                treatments.len() - 1
            }
        };
        if t_idx > 1 {
            return Err(StatError::validation(
                "Paired data must pivot to exactly two treatment columns.",
            ));
        }

        let s_idx = match subjects.iter().position(|s| s == &subject) {
            Some(idx) => idx,
            None => {
                subjects.push(subject);
                cells.push([None, None]);
                subjects.len() - 1
            }
        };
        if cells[s_idx][t_idx].is_some() {
            return Err(StatError::validation(format!(
                "Subject '{}' has more than one '{}' measurement.",
                subjects[s_idx], treatments[t_idx]
            )));
        }
        cells[s_idx][t_idx] = Some(value);
    }

    if treatments.len() != 2 {
        return Err(StatError::validation(
            "Paired data must pivot to exactly two treatment columns.",
        ));
    }

    let mut before = Vec::with_capacity(cells.len());
    let mut after = Vec::with_capacity(cells.len());
    for (subject, cell) in subjects.iter().zip(cells) {
        match cell {
            [Some(b), Some(a)] => {
                before.push(b);
                after.push(a);
            }
            _ => {
                return Err(StatError::validation(format!(
                    "Subject '{subject}' is missing a measurement."
                )))
            }
        }
    }

    Ok((before, after))
}
