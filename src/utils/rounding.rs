//! 數值取整工具

/// 將數值四捨五入到指定的小數位數
///
/// 非有限值（NaN 或無限大）原樣返回，由呼叫端決定如何處理。
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // 極大數值乘上倍率後可能溢位
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
