//! Reusable preprocessing object.
//!
//! A [`PreProcessor`] holds a pipeline and validated options so the same
//! cleaning can be applied to several inputs. It follows the fit/transform
//! convention of feature pipelines; fitting learns nothing.

use docprep_model::{
    DocumentCollection, PipelineOptions, PipelineSettings, Result, Shape,
};
use docprep_transform::DEFAULT_PIPELINE;

use crate::advisory::Advisory;
use crate::pipeline::{Engine, Step, named_pipeline};

#[derive(Debug, Clone)]
pub struct PreProcessor {
    pipeline: Vec<Step>,
    options: PipelineOptions,
    settings: PipelineSettings,
    engine: Engine,
    advisories: Vec<Advisory>,
}

impl PreProcessor {
    /// Validates `options` and checks the step order once.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error in `options`.
    pub fn new(pipeline: Vec<Step>, options: PipelineOptions) -> Result<Self> {
        Self::with_engine(Engine::default(), pipeline, options)
    }

    /// Same as [`PreProcessor::new`] with a custom engine.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error in `options`.
    pub fn with_engine(engine: Engine, pipeline: Vec<Step>, options: PipelineOptions) -> Result<Self> {
        let settings = options.validate()?;
        if !settings.modify_data {
            tracing::warn!(
                "modify_data is false: processed documents go to a new column, \
                 which only applies to tables and files"
            );
        }
        let advisories = engine.check(&pipeline);
        Ok(Self {
            pipeline,
            options,
            settings,
            engine,
            advisories,
        })
    }

    pub fn pipeline(&self) -> &[Step] {
        &self.pipeline
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Advisories found when the pipeline was last set.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Replaces the pipeline and checks the new step order.
    pub fn set_pipeline(&mut self, pipeline: Vec<Step>) {
        self.advisories = self.engine.check(&pipeline);
        self.pipeline = pipeline;
    }

    /// No-op; there is nothing to learn from the input.
    pub fn fit(&self, _input: &DocumentCollection) -> &Self {
        self
    }

    /// Runs the pipeline on `input` and returns the result in the same
    /// shape (a new path for file input).
    ///
    /// # Errors
    ///
    /// Any read, write or step error from the run.
    pub fn transform(&self, input: &DocumentCollection) -> Result<DocumentCollection> {
        if input.shape() != Shape::IndexedSequence {
            tracing::warn!(
                shape = ?input.shape(),
                "input is not an indexed sequence, output keeps the input shape"
            );
        }
        self.engine.execute(input, &self.pipeline, &self.settings)
    }

    /// [`PreProcessor::fit`] followed by [`PreProcessor::transform`].
    ///
    /// # Errors
    ///
    /// See [`PreProcessor::transform`].
    pub fn fit_transform(&self, input: &DocumentCollection) -> Result<DocumentCollection> {
        self.fit(input).transform(input)
    }
}

impl Default for PreProcessor {
    fn default() -> Self {
        let engine = Engine::default();
        let pipeline = named_pipeline(DEFAULT_PIPELINE);
        let advisories = engine.check(&pipeline);
        Self {
            pipeline,
            options: PipelineOptions::default(),
            settings: PipelineSettings::default(),
            engine,
            advisories,
        }
    }
}
