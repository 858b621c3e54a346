use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ── Metric keys ───────────────────────────────────────────────────────────────

/// Known ratio keys as they appear in the `/api/financial-ratios/` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Roa,
    Roe,
    CurrentRatio,
    DebtToAssets,
    AssetGrowth,
    ProfitGrowth,
    Eps,
    Pe,
    Pb,
    Beta,
    YearEndClose,
    LongTermDebtRatio,
}

impl Metric {
    /// Column order used by the flat export.
    pub const ALL: [Metric; 12] = [
        Metric::Roa,
        Metric::Roe,
        Metric::CurrentRatio,
        Metric::DebtToAssets,
        Metric::AssetGrowth,
        Metric::ProfitGrowth,
        Metric::Eps,
        Metric::Pe,
        Metric::Pb,
        Metric::Beta,
        Metric::YearEndClose,
        Metric::LongTermDebtRatio,
    ];

    /// Wire key inside a metrics record.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Roa => "ROA",
            Metric::Roe => "ROE",
            Metric::CurrentRatio => "TySuatThanhToanHienHanh",
            Metric::DebtToAssets => "HeSoNoTrenTongTaiSan",
            Metric::AssetGrowth => "TangTruongTaiSan",
            Metric::ProfitGrowth => "TangTruongLoiNhuan",
            Metric::Eps => "EPS",
            Metric::Pe => "PE",
            Metric::Pb => "PB",
            Metric::Beta => "Beta",
            Metric::YearEndClose => "GiaDongCuaCuoiNam",
            Metric::LongTermDebtRatio => "TyLeNoDaiHan",
        }
    }

    /// Human-readable name for legends and table headers.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Roa => "ROA",
            Metric::Roe => "ROE",
            Metric::CurrentRatio => "Current Ratio",
            Metric::DebtToAssets => "Debt / Total Assets",
            Metric::AssetGrowth => "Asset Growth",
            Metric::ProfitGrowth => "Profit Growth",
            Metric::Eps => "EPS",
            Metric::Pe => "P/E",
            Metric::Pb => "P/B",
            Metric::Beta => "Beta",
            Metric::YearEndClose => "Year-End Close",
            Metric::LongTermDebtRatio => "Long-Term Debt Ratio",
        }
    }
}

// ── Metrics record ────────────────────────────────────────────────────────────

/// One fiscal year of ratios. Non-numeric values are kept as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "IndexMap<String, Value>")]
pub struct MetricsRecord {
    values: IndexMap<String, Option<f64>>,
}

impl MetricsRecord {
    /// Value for a wire key; absent and null both read as `None`.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.get(metric.key())
    }

}

impl From<IndexMap<String, Value>> for MetricsRecord {
    fn from(raw: IndexMap<String, Value>) -> Self {
        let values = raw
            .into_iter()
            .map(|(k, v)| (k, v.as_f64().filter(|f| f.is_finite())))
            .collect();
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<f64>)> for MetricsRecord {
    fn from_iter<I: IntoIterator<Item = (K, Option<f64>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ── Company record ────────────────────────────────────────────────────────────

/// A year entry in `annual_reports`. The backend writes a plain string
/// instead of an object for years it could not compute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnnualReport {
    Metrics(MetricsRecord),
    Note(Value),
}

impl AnnualReport {
    pub fn metrics(&self) -> Option<&MetricsRecord> {
        match self {
            AnnualReport::Metrics(m) => Some(m),
            AnnualReport::Note(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "tenCongTy", default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,

    #[serde(rename = "TongSoNamThuThap", default, deserialize_with = "lenient_count")]
    pub total_years_collected: Option<u32>,

    #[serde(default)]
    pub annual_reports: Option<IndexMap<String, AnnualReport>>,
}

/// Anything that failed to parse as a record stays in the dataset so the
/// company is still listed; selecting it renders nothing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CompanyEntry {
    Record(CompanyRecord),
    Malformed(Value),
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Whole `/api/financial-ratios/` body, in server insertion order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RatioDataset {
    companies: IndexMap<String, CompanyEntry>,
}

impl RatioDataset {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.companies.keys().map(String::as_str)
    }

    pub fn first_code(&self) -> Option<&str> {
        self.companies.keys().next().map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.companies.contains_key(code)
    }

    /// Well-formed record for `code`, if any.
    pub fn company(&self, code: &str) -> Option<&CompanyRecord> {
        match self.companies.get(code)? {
            CompanyEntry::Record(r) => Some(r),
            CompanyEntry::Malformed(_) => None,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = (&str, &CompanyRecord)> {
        self.companies.iter().filter_map(|(code, entry)| match entry {
            CompanyEntry::Record(r) => Some((code.as_str(), r)),
            CompanyEntry::Malformed(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }
}

// ── Lenient field parsers ─────────────────────────────────────────────────────

fn lenient_count<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.round() as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}
