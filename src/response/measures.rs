// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measures-total payload.

use serde::Deserialize;

use crate::types::Measure;

/// Payload of a successful `/api/measures/total` call.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasuresTotalPayload {
    /// The measure block.
    pub measure: MeasureValues,
}

/// Wrapper holding the measure list.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureValues {
    /// Measures in the order the API sent them.
    pub values: Vec<Measure>,
}

impl MeasuresTotalPayload {
    /// Returns the measures, keeping their order.
    #[must_use]
    pub fn into_measures(self) -> Vec<Measure> {
        self.measure.values
    }
}
