use crate::{CompiledOperation, Error, OperationSpec, Payload};

/// Expands operation specifications into a flat list of single-semaphore operations.
///
/// The order of `specs` is preserved and each range is expanded in ascending semaphore order,
/// so the result is suitable for submission to the kernel as one atomic operation list.
///
/// # Errors
///
/// Returns [`Error::EmptyOperationList`] if `specs` is empty.
pub fn compile(specs: &[OperationSpec]) -> crate::Result<Vec<CompiledOperation>> {
    let operations: Vec<CompiledOperation> = specs
        .iter()
        .flat_map(|spec| {
            spec.range().semaphores().map(move |semaphore_number| {
                CompiledOperation::new(semaphore_number, spec.magnitude(), spec.flags())
            })
        })
        .collect();

    if operations.is_empty() {
        return Err(Error::EmptyOperationList);
    }

    Ok(operations)
}

/// Produces one operation with the same payload for every semaphore in a set of `set_size`
/// semaphores.
///
/// # Errors
///
/// Returns [`Error::EmptyOperationList`] if the set has no semaphores.
pub fn compile_whole_set(payload: Payload, set_size: u16) -> crate::Result<Vec<CompiledOperation>> {
    if set_size == 0 {
        return Err(Error::EmptyOperationList);
    }

    Ok((0..set_size)
        .map(|semaphore_number| {
            CompiledOperation::new(semaphore_number, payload.magnitude(), payload.flags())
        })
        .collect())
}
