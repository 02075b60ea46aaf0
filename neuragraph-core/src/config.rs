use crate::error::NeuraGraphError;

/// Hyperparameters driving batched parameter updates.
///
/// `batch_size` controls how many training steps accumulate gradients before
/// every registered buffer is updated and cleared. The remaining fields feed
/// the update rule in [`TrainableData::train`](crate::buffer::TrainableData::train).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub learning_rate: f32,
    pub momentum: f32,
    pub l1_decay: f32,
    pub l2_decay: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            batch_size: 1,
            learning_rate: 0.01,
            momentum: 0.0,
            l1_decay: 0.0,
            l2_decay: 0.0,
        }
    }
}

impl TrainingConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_l1_decay(mut self, l1_decay: f32) -> Self {
        self.l1_decay = l1_decay;
        self
    }

    pub fn with_l2_decay(mut self, l2_decay: f32) -> Self {
        self.l2_decay = l2_decay;
        self
    }

    /// Checks the configuration before a network accepts it.
    ///
    /// # Errors
    /// `InvalidConfig` if the batch size is zero or any rate is negative or
    /// not finite.
    pub fn validate(&self) -> Result<(), NeuraGraphError> {
        if self.batch_size == 0 {
            return Err(NeuraGraphError::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        let rates = [
            ("learning_rate", self.learning_rate),
            ("momentum", self.momentum),
            ("l1_decay", self.l1_decay),
            ("l2_decay", self.l2_decay),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(NeuraGraphError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.momentum >= 1.0 {
            log::warn!(
                "TrainingConfig: momentum {} >= 1.0, updates will not decay",
                self.momentum
            );
        }
        Ok(())
    }
}
