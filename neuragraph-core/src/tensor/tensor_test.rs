// neuragraph-core/src/tensor/tensor_test.rs

use super::*;

#[test]
fn test_new_rejects_wrong_length() {
    let result = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
    assert_eq!(
        result,
        Err(NeuraGraphError::TensorCreationError {
            data_len: 3,
            shape: vec![2, 2]
        })
    );
}

#[test]
fn test_get_set_row_major() -> Result<(), NeuraGraphError> {
    let mut t = Tensor::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3])?;
    assert_eq!(t.get(&[1, 0])?, 3.0);
    t.set(&[0, 2], 9.0)?;
    assert_eq!(t.data(), &[0.0, 1.0, 9.0, 3.0, 4.0, 5.0]);
    assert!(t.get(&[2, 0]).is_err());
    assert!(t.get(&[0]).is_err());
    Ok(())
}

#[test]
fn test_at3_matches_get() -> Result<(), NeuraGraphError> {
    let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
    let t = Tensor::new(data, vec![2, 3, 4])?;
    assert_eq!(t.at3(1, 2, 3), t.get(&[1, 2, 3])?);
    assert_eq!(t.at3(0, 1, 2), 6.0);
    Ok(())
}

#[test]
fn test_image_index_rejected_on_wrong_rank() -> Result<(), NeuraGraphError> {
    let mut flat = Tensor::new(vec![0.0; 6], vec![2, 3])?;
    assert_eq!(
        flat.get(&[1, 2, 0]),
        Err(NeuraGraphError::IndexOutOfBounds {
            index: vec![1, 2, 0],
            shape: vec![2, 3],
        })
    );
    assert!(flat.set(&[0, 0, 0], 1.0).is_err());
    assert!(flat.data().iter().all(|&v| v == 0.0));

    let mut image = zeros(&[2, 3, 1]);
    assert!(image.set(&[0, 3, 0], 1.0).is_err());
    image.set(&[1, 2, 0], 1.0)?;
    assert_eq!(image.data()[5], 1.0);
    Ok(())
}

#[test]
fn test_add_assign_shape_checked() -> Result<(), NeuraGraphError> {
    let mut a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![0.5, 0.5], vec![2])?;
    a.add_assign(&b)?;
    assert_eq!(a.data(), &[1.5, 2.5]);

    let c = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    assert!(matches!(
        a.add_assign(&c),
        Err(NeuraGraphError::ShapeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_select_outer() -> Result<(), NeuraGraphError> {
    let batch = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2])?;
    let second = batch.select_outer(1)?;
    assert_eq!(second.shape(), &[2]);
    assert_eq!(second.data(), &[3.0, 4.0]);

    let labels = Tensor::new(vec![7.0, 8.0], vec![2])?;
    let label = labels.select_outer(1)?;
    assert_eq!(label.shape(), &[1]);
    assert_eq!(label.item(), Some(8.0));

    assert!(batch.select_outer(3).is_err());
    Ok(())
}

#[test]
fn test_argmax_first_on_tie() -> Result<(), NeuraGraphError> {
    let t = Tensor::new(vec![0.1, 0.7, 0.7, 0.2], vec![4])?;
    assert_eq!(t.argmax(), Some(1));
    Ok(())
}

#[test]
fn test_display_truncates() {
    let t = create::zeros(&[20]);
    let rendered = format!("{}", t);
    assert!(rendered.starts_with("[20] ["));
    assert!(rendered.contains("(4 more)"));
}
