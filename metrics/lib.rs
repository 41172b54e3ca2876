/*!
This crate provides the metric primitives used to score benchmark predictions: classification metrics such as [`accuracy`](fn.accuracy.html), [`auc_roc`](fn.auc_roc.html) and [`log_loss`](fn.log_loss.html), and regression metrics such as [`mean_squared_error`](fn.mean_squared_error.html).

All metrics take truth and predictions already encoded into the canonical ordinal space, where class `i` corresponds to column `i` of the probability matrix.
*/

mod accuracy;
mod auc_roc;
mod confusion_matrix;
mod f1;
mod log_loss;
mod regression;

pub use self::accuracy::{accuracy, balanced_accuracy};
pub use self::auc_roc::{auc_roc, roc_curve, RocCurvePoint};
pub use self::confusion_matrix::{confusion_matrix, per_class_error_rates};
pub use self::f1::f1;
pub use self::log_loss::log_loss;
pub use self::regression::{
	mean_absolute_error, mean_squared_error, mean_squared_log_error, r2_score,
};
