// Defaults for parameters
const TOLERANCE_DEFAULT: f64 = 1e-12;

/// A wrapper around the configuration parameters of network reconstruction.
/// Only use if you want to tune the parameters. Otherwise use
/// `Razor::default_params(..)` to instantiate the engine with defaults.
#[derive(Debug, Clone)]
pub struct RazorParams {
    pub(crate) tolerance: f64,
}

/// Builder object to set custom reconstruction parameters.
pub struct RazorParamsBuilder {
    tolerance: Option<f64>,
}

impl RazorParams {
    pub(crate) fn default() -> Self {
        Self::builder().build()
    }

    /// Enters the builder pattern, allowing custom parameters to be set using
    /// the setter methods.
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn builder() -> RazorParamsBuilder {
        RazorParamsBuilder { tolerance: None }
    }

    /// The comparison tolerance this configuration carries.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl RazorParamsBuilder {
    /// Sets the comparison tolerance. All approximate floating point
    /// comparisons made during reconstruction (slack positivity, vertex
    /// coincidence, redundant edge detection, metric repair) treat values
    /// within this distance of each other as equal. Must be strictly
    /// positive. Defaults to 1e-12.
    ///
    /// # Parameters
    /// * tolerance - the comparison tolerance
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn tolerance(mut self, tolerance: f64) -> RazorParamsBuilder {
        let valid_tolerance = RazorParamsBuilder::validate_positive(tolerance, "tolerance");
        self.tolerance = Some(valid_tolerance);
        self
    }

    /// Finishes the building of the parameter configuration. A call to this
    /// method is required to exit the builder pattern and complete the
    /// construction of the parameters.
    ///
    /// # Returns
    /// * The completed reconstruction parameter configuration.
    pub fn build(self) -> RazorParams {
        RazorParams {
            tolerance: self.tolerance.unwrap_or(TOLERANCE_DEFAULT),
        }
    }

    fn validate_positive(input_param: f64, param: &str) -> f64 {
        if input_param <= 0.0 || !input_param.is_finite() {
            log::warn!(
                "{param} ({input_param}) must be a finite positive number. \
                Set to {TOLERANCE_DEFAULT}."
            );
            TOLERANCE_DEFAULT
        } else {
            input_param
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance() {
        let params = RazorParams::default();
        assert_eq!(1e-12, params.tolerance);
    }

    #[test]
    fn custom_tolerance() {
        let params = RazorParams::builder().tolerance(1e-9).build();
        assert_eq!(1e-9, params.tolerance);
    }

    #[test]
    fn invalid_tolerance_falls_back_to_default() {
        let params = RazorParams::builder().tolerance(-1.0).build();
        assert_eq!(1e-12, params.tolerance);

        let params = RazorParams::builder().tolerance(f64::NAN).build();
        assert_eq!(1e-12, params.tolerance);
    }
}
