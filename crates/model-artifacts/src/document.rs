// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON interchange form of a quantized model.
//!
//! The training stage hands over its integer-quantized parameters in this
//! document; `kinfer export` turns it into binary artifacts.
//!
//! ```json
//! {
//!   "dims": { "input": 784, "hidden": 32, "output": 10 },
//!   "hidden_weights": { "values": [12, -7, ...], "quant": { "scales": [...], "zero_point": 0 } },
//!   "hidden_bias":    { "values": [5012, ...] },
//!   "output_weights": { "values": [...], "quant": { "scales": [...] } },
//!   "output_bias":    { "values": [...] }
//! }
//! ```
//!
//! Values are listed row-major. They are range-checked against the role's
//! element type before any tensor is built.

use crate::artifact::{Unchecked, Validated};
use crate::{ArtifactError, ModelArtifactSet, ModelDims, TensorRole};
use std::path::Path;
use tensor_core::{DType, QuantParams, QuantizedTensor};

/// One tensor's integer values and quantization parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorDocument {
    pub values: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quant: Option<QuantParams>,
}

/// A complete quantized model as produced by the training stage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QuantizedModelDocument {
    #[serde(default)]
    pub dims: ModelDims,
    pub hidden_weights: TensorDocument,
    pub hidden_bias: TensorDocument,
    pub output_weights: TensorDocument,
    pub output_bias: TensorDocument,
}

impl QuantizedModelDocument {
    /// Loads a document from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    fn tensor_doc(&self, role: TensorRole) -> &TensorDocument {
        match role {
            TensorRole::HiddenWeights => &self.hidden_weights,
            TensorRole::HiddenBias => &self.hidden_bias,
            TensorRole::OutputWeights => &self.output_weights,
            TensorRole::OutputBias => &self.output_bias,
        }
    }

    /// Builds the unchecked artifact set, range-checking every value.
    pub fn to_artifact_set(&self) -> Result<ModelArtifactSet<Unchecked>, ArtifactError> {
        let build = |role: TensorRole| -> Result<QuantizedTensor, ArtifactError> {
            let doc = self.tensor_doc(role);
            let shape = role.shape(&self.dims);
            if doc.values.len() != shape.num_elements() {
                return Err(ArtifactError::InvalidTensor {
                    role,
                    detail: format!(
                        "{} values for shape {shape} ({} elements)",
                        doc.values.len(),
                        shape.num_elements()
                    ),
                });
            }
            let tensor = match role.dtype() {
                DType::I8 => {
                    let values = narrow::<i8>(role, &doc.values)?;
                    QuantizedTensor::from_i8(shape, &values)?
                }
                _ => {
                    let values = narrow::<i32>(role, &doc.values)?;
                    QuantizedTensor::from_i32(shape, &values)?
                }
            };
            match &doc.quant {
                Some(q) => Ok(tensor.with_quant(q.clone())?),
                None => Ok(tensor),
            }
        };

        Ok(ModelArtifactSet::new(
            self.dims,
            build(TensorRole::HiddenWeights)?,
            build(TensorRole::HiddenBias)?,
            build(TensorRole::OutputWeights)?,
            build(TensorRole::OutputBias)?,
        ))
    }

    /// Builds and validates the artifact set.
    pub fn into_validated(self) -> Result<ModelArtifactSet<Validated>, ArtifactError> {
        self.dims.validate()?;
        self.to_artifact_set()?.validate()
    }
}

fn narrow<T>(role: TensorRole, values: &[i64]) -> Result<Vec<T>, ArtifactError>
where
    T: TryFrom<i64>,
{
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            T::try_from(*v).map_err(|_| ArtifactError::InvalidTensor {
                role,
                detail: format!("value {v} at index {i} does not fit {}", role.dtype()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_json(hidden_bias: &str) -> String {
        format!(
            r#"{{
                "dims": {{ "input": 2, "hidden": 2, "output": 1 }},
                "hidden_weights": {{ "values": [1, -1, 127, -128], "quant": {{ "scales": [0.5, 0.25] }} }},
                "hidden_bias": {{ "values": {hidden_bias} }},
                "output_weights": {{ "values": [3, 4] }},
                "output_bias": {{ "values": [-7] }}
            }}"#
        )
    }

    #[test]
    fn test_document_to_set() {
        let doc = QuantizedModelDocument::from_json(&doc_json("[100000, -2]")).unwrap();
        let set = doc.into_validated().unwrap();
        assert_eq!(
            set.tensor(TensorRole::HiddenWeights).to_i8_vec().unwrap(),
            vec![1, -1, 127, -128]
        );
        assert_eq!(
            set.tensor(TensorRole::HiddenBias).to_i32_vec().unwrap(),
            vec![100000, -2]
        );
        let q = set.tensor(TensorRole::HiddenWeights).quant().unwrap();
        assert_eq!(q.zero_point, 0);
    }

    #[test]
    fn test_weight_out_of_range() {
        let json = doc_json("[0, 0]").replace("127, -128", "128, -128");
        let doc = QuantizedModelDocument::from_json(&json).unwrap();
        let err = doc.into_validated().unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::InvalidTensor {
                role: TensorRole::HiddenWeights,
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_value_count() {
        let doc = QuantizedModelDocument::from_json(&doc_json("[1, 2, 3]")).unwrap();
        let err = doc.into_validated().unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::InvalidTensor {
                role: TensorRole::HiddenBias,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            QuantizedModelDocument::from_json("{ not json"),
            Err(ArtifactError::Json(_))
        ));
    }
}
