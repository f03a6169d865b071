//! Interface of the networks composing a Q-network.
use tch::{nn::VarStore, Tensor};

/// Input of a Q-network.
///
/// `joint` is `None` for networks reading only the local features.
#[derive(Debug)]
pub struct QInput {
    /// Master input, `[batch, master_dim]`.
    pub joint: Option<Tensor>,

    /// Local features, `[batch, 9]`.
    pub local: Tensor,
}

/// Neural network model that can be initialized with [`VarStore`] and configuration.
///
/// Modules composing a network share a [`VarStore`], so structs implementing
/// this trait are built on a given one. Cloning onto another [`VarStore`]
/// gives the frozen copy of a network.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait SubModel {
    /// Configuration from which [`SubModel`] is constructed.
    type Config;

    /// Input of the [`SubModel`].
    type Input;

    /// Output of the [`SubModel`].
    type Output;

    /// Builds [`SubModel`] with [`VarStore`] and [`SubModel::Config`].
    fn build(var_store: &VarStore, config: Self::Config) -> Self;

    /// Clones [`SubModel`] with [`VarStore`].
    fn clone_with_var_store(&self, var_store: &VarStore) -> Self;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}
