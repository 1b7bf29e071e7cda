//! Properties of the Lobatto basis and its operators.
//!
//! Verifies the summation-by-parts identity, exact differentiation of
//! polynomials, the tensor-product layout and the conservation property of
//! the mortar projections.

use dgsem::operators::{
    LobattoBasis, MortarPosition, TensorLayout, apply_along_axis, boundary_matrix, sbp_defect,
};

#[test]
fn test_sbp_identity_for_all_degrees() {
    for polydeg in 1..=8 {
        let basis = LobattoBasis::new(polydeg).unwrap();
        let n = basis.nnodes();
        let b = boundary_matrix(n);

        let mut max_defect: f64 = 0.0;
        for i in 0..n {
            for j in 0..n {
                let q_sym = basis.weights[i] * basis.d(i, j) + basis.weights[j] * basis.d(j, i);
                max_defect = max_defect.max((q_sym - b[i * n + j]).abs());
            }
        }
        assert!(max_defect < 1e-12, "p={}: SBP defect {:.3e}", polydeg, max_defect);
        assert!(sbp_defect(&basis.derivative_matrix, &basis.weights) < 1e-12);
    }
}

#[test]
fn test_weights_integrate_to_two() {
    for polydeg in 1..=8 {
        let basis = LobattoBasis::new(polydeg).unwrap();
        let sum: f64 = basis.weights.iter().sum();
        assert!((sum - 2.0).abs() < 1e-14, "p={}: sum of weights {}", polydeg, sum);
        for (w, inv_w) in basis.weights.iter().zip(&basis.inverse_weights) {
            assert!((w * inv_w - 1.0).abs() < 1e-14);
        }
    }
}

#[test]
fn test_degree_zero_is_rejected() {
    assert!(LobattoBasis::new(0).is_err());
}

#[test]
fn test_derivative_along_each_axis_in_3d() {
    let basis = LobattoBasis::new(4).unwrap();
    let layout = basis.layout(3);
    let x: Vec<[f64; 1]> = (0..layout.n_nodes())
        .map(|node| {
            let idx = layout.multi_index(node);
            let (a, b, c) = (basis.nodes[idx[0]], basis.nodes[idx[1]], basis.nodes[idx[2]]);
            [a * a * b + c.powi(4)]
        })
        .collect();

    let mut dx = vec![[0.0]; layout.n_nodes()];
    for axis in 0..3 {
        apply_along_axis(&layout, &basis.derivative_matrix, axis, &x, &mut dx);
        for (node, d) in dx.iter().enumerate() {
            let idx = layout.multi_index(node);
            let (a, b, c) = (basis.nodes[idx[0]], basis.nodes[idx[1]], basis.nodes[idx[2]]);
            let exact = match axis {
                0 => 2.0 * a * b,
                1 => a * a,
                _ => 4.0 * c.powi(3),
            };
            assert!(
                (d[0] - exact).abs() < 1e-12,
                "axis {} node {}: {} vs {}",
                axis,
                node,
                d[0],
                exact
            );
        }
    }
}

#[test]
fn test_face_nodes_lie_on_their_face() {
    let layout = TensorLayout::new(3, 4);
    for face in 0..layout.n_faces() {
        let axis = face / 2;
        let expected = if face % 2 == 0 { 0 } else { 3 };
        for t in 0..layout.n_face_nodes() {
            let idx = layout.multi_index(layout.face_node(face, t));
            assert_eq!(idx[axis], expected, "face {} node {}", face, t);
        }
    }
}

#[test]
fn test_mortar_projection_is_conservative() {
    for polydeg in 1..=6 {
        let basis = LobattoBasis::new(polydeg).unwrap();
        let n = basis.nnodes();
        let mortar = &basis.mortar;

        // w^T R = 0.5 w^T for both halves
        for position in MortarPosition::ALL {
            let reverse = mortar.reverse(position);
            for j in 0..n {
                let projected: f64 = (0..n).map(|i| basis.weights[i] * reverse[i * n + j]).sum();
                assert!(
                    (projected - 0.5 * basis.weights[j]).abs() < 1e-13,
                    "p={} {:?} column {}: {} vs {}",
                    polydeg,
                    position,
                    j,
                    projected,
                    0.5 * basis.weights[j]
                );
            }
        }
    }
}

#[test]
fn test_mortar_interpolation_and_projection_of_polynomials() {
    let basis = LobattoBasis::new(3).unwrap();
    let mortar = &basis.mortar;
    let f = |x: f64| 1.0 + x - 0.5 * x * x + 0.25 * x * x * x;
    let large: Vec<[f64; 1]> = basis.nodes.iter().map(|&x| [f(x)]).collect();

    let mut small = [vec![[0.0]; 4], vec![[0.0]; 4]];
    for (position, values) in MortarPosition::ALL.into_iter().zip(small.iter_mut()) {
        mortar.apply(mortar.forward(position), &large, values);
        for (eta, v) in basis.nodes.iter().zip(values.iter()) {
            let x = 0.5 * eta + position.offset();
            assert!((v[0] - f(x)).abs() < 1e-13);
        }
    }

    // Projecting both halves of a degree-p polynomial back recovers it.
    let mut back = vec![[0.0]; 4];
    for (position, values) in MortarPosition::ALL.into_iter().zip(small.iter()) {
        mortar.apply_add(mortar.reverse(position), values, &mut back);
    }
    for (b, l) in back.iter().zip(&large) {
        assert!((b[0] - l[0]).abs() < 1e-12, "{} vs {}", b[0], l[0]);
    }
}
