//! Contract interfaces for a Djed deployment.
//!
//! Only the functions this client calls are declared. Calldata is
//! encoded with the generated `*Call` structs and results are decoded
//! with `SolValue`.

use alloy::sol;

sol! {
    /// Djed protocol contract.
    interface IDjed {
        function stableCoin() external view returns (address);
        function reserveCoin() external view returns (address);

        function reserveBC() external view returns (uint256);
        function getReserveRatio() external view returns (uint256);
        function getStableCoinWholeTargetPriceBC() external view returns (uint256);
        function getReserveCoinWholeBuyPriceBC() external view returns (uint256);
        function getReserveCoinWholeSellPriceBC() external view returns (uint256);

        function reserveRatioMin() external view returns (uint256);
        function reserveRatioMax() external view returns (uint256);
        function fee() external view returns (uint256);
        function thresholdNumberSC() external view returns (uint256);

        function getPriceBuyNStableCoinsBC(uint256 amountSC) external view returns (uint256);
        function getPriceSellNStableCoinsBC(uint256 amountSC) external view returns (uint256);
        function getPriceBuyNReserveCoinsBC(uint256 amountRC) external view returns (uint256);
        function getPriceSellNReserveCoinsBC(uint256 amountRC) external view returns (uint256);

        function checkBuyableNStableCoins(uint256 amountSC) external view returns (bool);
        function checkBuyableNReserveCoins(uint256 amountRC) external view returns (bool);
        function checkSellableNReserveCoins(uint256 amountRC) external view returns (bool);

        function getMaxBuyableStableCoins() external view returns (uint256);
        function getMaxBuyableReserveCoins() external view returns (uint256);
        function getMaxSellableReserveCoins() external view returns (uint256);

        function buyStableCoins() external payable;
        function sellStableCoins(uint256 amountSC) external;
        function buyReserveCoins() external payable;
        function sellReserveCoins(uint256 amountRC) external;
    }

    /// Stablecoin and reservecoin token contracts.
    interface IDjedCoin {
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    /// Base-asset price oracle.
    interface IOracle {
        function exchangeRate() external view returns (uint256);
    }
}
