//! Public library API for decoding MATLAB Level-5 `.mat` files.

/// MAT-file parsing, array model, and MCOS object resolution.
pub mod mat;
