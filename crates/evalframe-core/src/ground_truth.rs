//! Ground-truth question/answer pairs, read from a CSV object whose location
//! is stored in the parameter store.

use serde::{Deserialize, Serialize};

use crate::config::{GroundTruthConfig, ParametersConfig};
use crate::error::StoreError;
use crate::store::{get_json_parameter, parameter_name, BlobStore, ParameterStore, GROUND_TRUTH_PARAMETER};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One question with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub gt_id: String,
    pub question: String,
    pub ground_truth: String,
}

/// Where an application's ground-truth file lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroundTruthLocation {
    pub bucket: String,
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
struct Row {
    app_name: String,
    gt_id: String,
    question: String,
    ground_truth: String,
}

/// Parse a ground-truth CSV, keeping the rows that belong to `application`.
///
/// The file must have a header row naming at least `app_name`, `gt_id`,
/// `question` and `ground_truth`; extra columns are ignored. A leading UTF-8
/// byte-order mark is skipped.
pub fn parse_ground_truth(body: &[u8], application: &str) -> Result<Vec<GroundTruth>, csv::Error> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let mut reader = csv::Reader::from_reader(body);

    let mut items = Vec::new();
    for row in reader.deserialize::<Row>() {
        let row = row?;
        if row.app_name == application {
            items.push(GroundTruth {
                gt_id: row.gt_id,
                question: row.question,
                ground_truth: row.ground_truth,
            });
        }
    }
    Ok(items)
}

/// Load `application`'s ground truth.
///
/// Every failure along the way (missing parameter, undecodable location,
/// missing object, malformed CSV) is logged and yields an empty list.
pub fn read_ground_truth(
    application: &str,
    params: &dyn ParameterStore,
    blobs: &dyn BlobStore,
    parameters: &ParametersConfig,
    settings: &GroundTruthConfig,
) -> Vec<GroundTruth> {
    let name = parameter_name(&parameters.prefix, application, GROUND_TRUTH_PARAMETER);
    match try_read(application, &name, params, blobs, settings) {
        Ok(items) => items,
        Err(StoreError::ParameterNotFound(_)) => {
            tracing::error!(parameter = %name, "ground truth parameter not found");
            Vec::new()
        }
        Err(StoreError::NoSuchKey { bucket, key }) => {
            tracing::error!(%bucket, %key, "ground truth file not found");
            Vec::new()
        }
        Err(e) => {
            tracing::error!(application, error = %e, "could not read ground truth");
            Vec::new()
        }
    }
}

fn try_read(
    application: &str,
    name: &str,
    params: &dyn ParameterStore,
    blobs: &dyn BlobStore,
    settings: &GroundTruthConfig,
) -> Result<Vec<GroundTruth>, StoreError> {
    let location: GroundTruthLocation = get_json_parameter(params, name)?;
    let key = format!("{}{}", location.prefix, settings.file_name);
    let body = blobs.get_object(&location.bucket, &key)?;
    parse_ground_truth(&body, application)
        .map_err(|e| StoreError::decode(format!("{}/{key}", location.bucket), e))
}
