// 2D scalar map: row-major Vec<Vec<f64>> of size Ny×Nx
// access as `map[y][x]`, row 0 is the top row of the written grid.
pub type Field2D = Vec<Vec<f64>>;

// Smallest and largest value of the map, None for an empty map
pub fn min_max2(map: &[Vec<f64>]) -> Option<(f64, f64)> {
    let mut values = map.iter().flatten().copied();
    let first = values.next()?;
    Some(values.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}

// Sample mean and population standard deviation (ddof = 0)
pub fn mean_std2(map: &[Vec<f64>]) -> (f64, f64) {
    let count = map.iter().map(Vec::len).sum::<usize>();
    if count == 0 {
        return (0.0, 0.0);
    }
    let n = count as f64;
    let mean = map.iter().flatten().sum::<f64>() / n;
    let var = map
        .iter()
        .flatten()
        .map(|&v| (v - mean) * (v - mean))
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

// Shift and scale the map in place to zero mean and unit standard deviation.
// Returns false when the map is constant; it is then left centred at zero.
pub fn standardize2(map: &mut Field2D) -> bool {
    let (mean, std) = mean_std2(map);
    let scalable = std.is_finite() && std > 0.0;
    for row in map.iter_mut() {
        for val in row.iter_mut() {
            *val -= mean;
            if scalable {
                *val /= std;
            }
        }
    }
    if !scalable {
        return false;
    }

    // A second pass removes the rounding left over from the first one
    let (mean, std) = mean_std2(map);
    if std > 0.0 {
        for val in map.iter_mut().flatten() {
            *val = (*val - mean) / std;
        }
    }
    true
}
